//! Statement registry: the SQL template behind every [`Route`].
//!
//! Placeholders are positional (`$1..$n`) and bound in the order the form fields are submitted.
//! Parameters always travel as text (or NULL), so placeholders landing in non-text columns carry
//! an explicit cast.

use crate::routes::{Entity, Operation, Report, Route};
use crate::rows::RowKind;

/// A parameterized SQL template with its expected parameter count and row shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    pub sql: &'static str,
    pub arity: usize,
    pub rows: RowKind,
}

impl Statement {
    const fn new(sql: &'static str, arity: usize, rows: RowKind) -> Self {
        Self { sql, arity, rows }
    }

    /// Highest `$n` placeholder index in the template, 0 when there are none.
    pub fn placeholder_count(&self) -> usize {
        let bytes = self.sql.as_bytes();
        let mut highest = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'$' {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                if end > start {
                    if let Ok(n) = self.sql[start..end].parse::<usize>() {
                        highest = highest.max(n);
                    }
                }
                i = end.max(start);
            } else {
                i += 1;
            }
        }
        highest
    }
}

const PATIENT_LIST: &str =
    "SELECT tc, isim, soyisim, cinsiyet, adres, dogum_tarihi FROM hasta ORDER BY tc";
const PATIENT_CREATE: &str = "INSERT INTO hasta(tc, isim, soyisim, cinsiyet, adres, dogum_tarihi) \
     VALUES($1, $2, $3, $4, $5, $6::date)";
const PATIENT_UPDATE: &str = "UPDATE hasta SET isim = $2, soyisim = $3, cinsiyet = $4, adres = $5, \
     dogum_tarihi = $6::date WHERE tc = $1";
const PATIENT_DELETE: &str = "DELETE FROM hasta WHERE tc = $1";

const DOCTOR_LIST: &str =
    "SELECT tc, isim, soyisim, cinsiyet, alan, unvan FROM doktor ORDER BY tc";
const DOCTOR_CREATE: &str = "INSERT INTO doktor(tc, isim, soyisim, cinsiyet, alan, unvan) \
     VALUES($1, $2, $3, $4, $5, $6)";
const DOCTOR_UPDATE: &str = "UPDATE doktor SET isim = $2, soyisim = $3, cinsiyet = $4, alan = $5, \
     unvan = $6 WHERE tc = $1";
const DOCTOR_DELETE: &str = "DELETE FROM doktor WHERE tc = $1";

const PRESCRIPTION_LIST: &str = "SELECT recete_id, hasta_tc, doktor_tc, ilac, verilen_tarih, \
     bitis_tarih FROM recete ORDER BY recete_id";
const PRESCRIPTION_CREATE: &str = "INSERT INTO recete(hasta_tc, doktor_tc, ilac, verilen_tarih, \
     bitis_tarih) VALUES($1, $2, $3, $4::date, $5::date)";
const PRESCRIPTION_UPDATE: &str = "UPDATE recete SET hasta_tc = $2, doktor_tc = $3, ilac = $4, \
     verilen_tarih = $5::date, bitis_tarih = $6::date WHERE recete_id = $1::integer";
const PRESCRIPTION_DELETE: &str = "DELETE FROM recete WHERE recete_id = $1::integer";

const EXAMINATION_LIST: &str =
    "SELECT muayene_id, randevu_id, sikayet, teshis FROM muayene ORDER BY muayene_id";
const EXAMINATION_CREATE: &str =
    "INSERT INTO muayene(randevu_id, sikayet, teshis) VALUES($1::integer, $2, $3)";
const EXAMINATION_UPDATE: &str = "UPDATE muayene SET randevu_id = $2::integer, sikayet = $3, \
     teshis = $4 WHERE muayene_id = $1::integer";
const EXAMINATION_DELETE: &str = "DELETE FROM muayene WHERE muayene_id = $1::integer";

const APPOINTMENT_LIST: &str =
    "SELECT randevu_id, hasta_tc, doktor_tc, tarih FROM randevu ORDER BY randevu_id";
const APPOINTMENT_CREATE: &str =
    "INSERT INTO randevu(hasta_tc, doktor_tc, tarih) VALUES($1, $2, $3::timestamp)";
const APPOINTMENT_UPDATE: &str = "UPDATE randevu SET hasta_tc = $2, doktor_tc = $3, \
     tarih = $4::timestamp WHERE randevu_id = $1::integer";
const APPOINTMENT_DELETE: &str = "DELETE FROM randevu WHERE randevu_id = $1::integer";

const DOCTOR_APPOINTMENTS: &str = "SELECT tc, isim, soyisim, cinsiyet, adres, dogum_tarihi, tarih \
     FROM randevu, hasta WHERE tc = hasta_tc AND doktor_tc = $1";

const LIST_USERS: &str = "(SELECT tc, isim, soyisim, cinsiyet, 'hasta'::text AS rol FROM hasta) \
     UNION \
     (SELECT tc, isim, soyisim, cinsiyet, 'doktor'::text AS rol FROM doktor)";

const BUSY_DOCTORS: &str = "SELECT doktor_tc, isim, soyisim, COUNT(*) AS hasta_sayisi \
     FROM randevu, doktor \
     WHERE tarih >= CURRENT_TIMESTAMP AND doktor_tc = tc \
     GROUP BY doktor_tc, isim, soyisim \
     HAVING COUNT(*) > 1 \
     ORDER BY hasta_sayisi DESC";

const COMPLETED_APPOINTMENTS: &str = "SELECT * FROM tamamlanmis_randevulari_goster";
const PATIENT_APPOINTMENTS: &str = "SELECT * FROM UNNEST(hasta_randevulari($1))";
const SEARCH_USERS: &str = "SELECT * FROM UNNEST(kullanici_ara($1))";
const PATIENT_PRESCRIPTIONS: &str = "SELECT * FROM UNNEST(hastanin_recetelerini_listele($1))";

impl Route {
    /// The statement this route executes.
    pub fn statement(self) -> Statement {
        use Entity::*;
        use Operation::*;

        match self {
            Route::Crud(Patient, List) => Statement::new(PATIENT_LIST, 0, RowKind::Patient),
            Route::Crud(Patient, Create) => Statement::new(PATIENT_CREATE, 6, RowKind::None),
            Route::Crud(Patient, Update) => Statement::new(PATIENT_UPDATE, 6, RowKind::None),
            Route::Crud(Patient, Delete) => Statement::new(PATIENT_DELETE, 1, RowKind::None),

            Route::Crud(Doctor, List) => Statement::new(DOCTOR_LIST, 0, RowKind::Doctor),
            Route::Crud(Doctor, Create) => Statement::new(DOCTOR_CREATE, 6, RowKind::None),
            Route::Crud(Doctor, Update) => Statement::new(DOCTOR_UPDATE, 6, RowKind::None),
            Route::Crud(Doctor, Delete) => Statement::new(DOCTOR_DELETE, 1, RowKind::None),

            Route::Crud(Prescription, List) => {
                Statement::new(PRESCRIPTION_LIST, 0, RowKind::Prescription)
            }
            Route::Crud(Prescription, Create) => {
                Statement::new(PRESCRIPTION_CREATE, 5, RowKind::None)
            }
            Route::Crud(Prescription, Update) => {
                Statement::new(PRESCRIPTION_UPDATE, 6, RowKind::None)
            }
            Route::Crud(Prescription, Delete) => {
                Statement::new(PRESCRIPTION_DELETE, 1, RowKind::None)
            }

            Route::Crud(Examination, List) => {
                Statement::new(EXAMINATION_LIST, 0, RowKind::Examination)
            }
            Route::Crud(Examination, Create) => {
                Statement::new(EXAMINATION_CREATE, 3, RowKind::None)
            }
            Route::Crud(Examination, Update) => {
                Statement::new(EXAMINATION_UPDATE, 4, RowKind::None)
            }
            Route::Crud(Examination, Delete) => {
                Statement::new(EXAMINATION_DELETE, 1, RowKind::None)
            }

            Route::Crud(Appointment, List) => {
                Statement::new(APPOINTMENT_LIST, 0, RowKind::Appointment)
            }
            Route::Crud(Appointment, Create) => {
                Statement::new(APPOINTMENT_CREATE, 3, RowKind::None)
            }
            Route::Crud(Appointment, Update) => {
                Statement::new(APPOINTMENT_UPDATE, 4, RowKind::None)
            }
            Route::Crud(Appointment, Delete) => {
                Statement::new(APPOINTMENT_DELETE, 1, RowKind::None)
            }

            Route::Report(Report::DoctorAppointments) => {
                Statement::new(DOCTOR_APPOINTMENTS, 1, RowKind::DoctorAppointment)
            }
            Route::Report(Report::ListUsers) => {
                Statement::new(LIST_USERS, 0, RowKind::UserSummary)
            }
            Route::Report(Report::BusyDoctors) => {
                Statement::new(BUSY_DOCTORS, 0, RowKind::BusyDoctor)
            }
            Route::Report(Report::CompletedAppointments) => {
                Statement::new(COMPLETED_APPOINTMENTS, 0, RowKind::Opaque)
            }
            Route::Report(Report::PatientAppointments) => {
                Statement::new(PATIENT_APPOINTMENTS, 1, RowKind::Opaque)
            }
            Route::Report(Report::SearchUsers) => Statement::new(SEARCH_USERS, 1, RowKind::Opaque),
            Route::Report(Report::PatientPrescriptions) => {
                Statement::new(PATIENT_PRESCRIPTIONS, 1, RowKind::Opaque)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::GetBehaviour;

    #[test]
    fn arity_matches_highest_placeholder() {
        for route in Route::all() {
            let statement = route.statement();
            assert_eq!(
                statement.placeholder_count(),
                statement.arity,
                "arity mismatch for {route}"
            );
        }
    }

    #[test]
    fn routes_executing_on_get_take_no_parameters() {
        for route in Route::all() {
            if route.get_behaviour() == GetBehaviour::Execute {
                assert_eq!(route.statement().arity, 0, "{route} runs on GET");
            }
        }
    }

    #[test]
    fn writes_return_no_rows() {
        for route in Route::all() {
            if let Route::Crud(_, op) = route {
                let expect_rows = op == Operation::List;
                assert_eq!(
                    route.statement().rows != RowKind::None,
                    expect_rows,
                    "{route}"
                );
            }
        }
    }

    #[test]
    fn updates_filter_by_first_placeholder() {
        let update = Route::Crud(Entity::Patient, Operation::Update).statement();
        assert!(update.sql.ends_with("WHERE tc = $1"));
        assert!(update.sql.contains("adres = $5"));

        let update = Route::Crud(Entity::Appointment, Operation::Update).statement();
        assert!(update.sql.ends_with("WHERE randevu_id = $1::integer"));
    }

    #[test]
    fn placeholder_count_handles_casts_and_literals() {
        let statement = Statement::new("SELECT '$' || $12::text, $3", 12, RowKind::Opaque);
        assert_eq!(statement.placeholder_count(), 12);
        let statement = Statement::new("SELECT 1", 0, RowKind::Opaque);
        assert_eq!(statement.placeholder_count(), 0);
    }
}
