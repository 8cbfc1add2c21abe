//! Row records decoded from statement results.
//!
//! Queries authored here decode into named, typed records. Results of views and functions owned
//! by the store are kept opaque: an ordered list of column/value cells rendered as text.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Shape of the rows a statement produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// The statement returns nothing of interest (insert, update, delete).
    None,
    Patient,
    Doctor,
    Prescription,
    Examination,
    Appointment,
    DoctorAppointment,
    UserSummary,
    BusyDoctor,
    /// Columns are only known at run time.
    Opaque,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Patient {
    #[sqlx(rename = "tc")]
    pub national_id: String,
    #[sqlx(rename = "isim")]
    pub given_name: Option<String>,
    #[sqlx(rename = "soyisim")]
    pub family_name: Option<String>,
    #[sqlx(rename = "cinsiyet")]
    pub sex: Option<String>,
    #[sqlx(rename = "adres")]
    pub address: Option<String>,
    #[sqlx(rename = "dogum_tarihi")]
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Doctor {
    #[sqlx(rename = "tc")]
    pub national_id: String,
    #[sqlx(rename = "isim")]
    pub given_name: Option<String>,
    #[sqlx(rename = "soyisim")]
    pub family_name: Option<String>,
    #[sqlx(rename = "cinsiyet")]
    pub sex: Option<String>,
    #[sqlx(rename = "alan")]
    pub specialty: Option<String>,
    #[sqlx(rename = "unvan")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Prescription {
    #[sqlx(rename = "recete_id")]
    pub id: i32,
    #[sqlx(rename = "hasta_tc")]
    pub patient_id: Option<String>,
    #[sqlx(rename = "doktor_tc")]
    pub doctor_id: Option<String>,
    #[sqlx(rename = "ilac")]
    pub medication: Option<String>,
    #[sqlx(rename = "verilen_tarih")]
    pub issued_on: Option<NaiveDate>,
    #[sqlx(rename = "bitis_tarih")]
    pub ends_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Examination {
    #[sqlx(rename = "muayene_id")]
    pub id: i32,
    #[sqlx(rename = "randevu_id")]
    pub appointment_id: Option<i32>,
    #[sqlx(rename = "sikayet")]
    pub complaint: Option<String>,
    #[sqlx(rename = "teshis")]
    pub diagnosis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Appointment {
    #[sqlx(rename = "randevu_id")]
    pub id: i32,
    #[sqlx(rename = "hasta_tc")]
    pub patient_id: Option<String>,
    #[sqlx(rename = "doktor_tc")]
    pub doctor_id: Option<String>,
    #[sqlx(rename = "tarih")]
    pub scheduled_at: Option<NaiveDateTime>,
}

/// A patient booked with a given doctor, with the appointment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct DoctorAppointment {
    #[sqlx(rename = "tc")]
    pub patient_id: String,
    #[sqlx(rename = "isim")]
    pub given_name: Option<String>,
    #[sqlx(rename = "soyisim")]
    pub family_name: Option<String>,
    #[sqlx(rename = "cinsiyet")]
    pub sex: Option<String>,
    #[sqlx(rename = "adres")]
    pub address: Option<String>,
    #[sqlx(rename = "dogum_tarihi")]
    pub birth_date: Option<NaiveDate>,
    #[sqlx(rename = "tarih")]
    pub scheduled_at: Option<NaiveDateTime>,
}

/// A patient or doctor in the combined user listing. `role` is `hasta` or `doktor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    #[sqlx(rename = "tc")]
    pub national_id: String,
    #[sqlx(rename = "isim")]
    pub given_name: Option<String>,
    #[sqlx(rename = "soyisim")]
    pub family_name: Option<String>,
    #[sqlx(rename = "cinsiyet")]
    pub sex: Option<String>,
    #[sqlx(rename = "rol")]
    pub role: String,
}

/// A doctor with more than one upcoming appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct BusyDoctor {
    #[sqlx(rename = "doktor_tc")]
    pub doctor_id: String,
    #[sqlx(rename = "isim")]
    pub given_name: Option<String>,
    #[sqlx(rename = "soyisim")]
    pub family_name: Option<String>,
    #[sqlx(rename = "hasta_sayisi")]
    pub appointment_count: i64,
}

/// One column of an opaque row, rendered as display text (`None` for SQL NULL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub column: String,
    pub value: Option<String>,
}

/// A row whose columns are decided by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpaqueRow {
    pub cells: Vec<Cell>,
}

impl OpaqueRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|cell| cell.column == column)
            .and_then(|cell| cell.value.as_deref())
    }
}

/// Decoded result of one statement execution.
///
/// Serializes as a plain sequence of row objects so templates iterate it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Rows {
    Patients(Vec<Patient>),
    Doctors(Vec<Doctor>),
    Prescriptions(Vec<Prescription>),
    Examinations(Vec<Examination>),
    Appointments(Vec<Appointment>),
    DoctorAppointments(Vec<DoctorAppointment>),
    Users(Vec<UserSummary>),
    BusyDoctors(Vec<BusyDoctor>),
    Opaque(Vec<OpaqueRow>),
}

impl Default for Rows {
    fn default() -> Self {
        Rows::Opaque(Vec::new())
    }
}

impl Rows {
    pub fn len(&self) -> usize {
        match self {
            Rows::Patients(rows) => rows.len(),
            Rows::Doctors(rows) => rows.len(),
            Rows::Prescriptions(rows) => rows.len(),
            Rows::Examinations(rows) => rows.len(),
            Rows::Appointments(rows) => rows.len(),
            Rows::DoctorAppointments(rows) => rows.len(),
            Rows::Users(rows) => rows.len(),
            Rows::BusyDoctors(rows) => rows.len(),
            Rows::Opaque(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
