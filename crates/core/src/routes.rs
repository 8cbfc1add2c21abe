//! The closed route table.
//!
//! Every URL the dispatcher serves corresponds to exactly one [`Route`]. A route knows its
//! statement key (which doubles as its URL path segment and its view key), which HTTP methods it
//! answers, and whether its GET executes a query or only renders an empty form.
//!
//! Keys are the Turkish table/operation names the schema and the templates use
//! (`hasta_ekle`, `doktor_randevulari`, ...).

use std::fmt;
use std::str::FromStr;

use crate::error::HastaneError;

/// One of the five record kinds stored in the hospital schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// `hasta`
    Patient,
    /// `doktor`
    Doctor,
    /// `recete`
    Prescription,
    /// `muayene`
    Examination,
    /// `randevu`
    Appointment,
}

impl Entity {
    pub const ALL: [Entity; 5] = [
        Entity::Patient,
        Entity::Doctor,
        Entity::Prescription,
        Entity::Examination,
        Entity::Appointment,
    ];

    /// Table name in the store.
    pub fn table(self) -> &'static str {
        match self {
            Entity::Patient => "hasta",
            Entity::Doctor => "doktor",
            Entity::Prescription => "recete",
            Entity::Examination => "muayene",
            Entity::Appointment => "randevu",
        }
    }
}

/// CRUD operation suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `listele`: select every row.
    List,
    /// `ekle`: insert.
    Create,
    /// `guncelle`: update keyed by the primary key.
    Update,
    /// `sil`: delete keyed by the primary key.
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::List,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Operation::List => "listele",
            Operation::Create => "ekle",
            Operation::Update => "guncelle",
            Operation::Delete => "sil",
        }
    }
}

/// Fixed, non-CRUD report routes backed by aggregate queries, views or functions in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    /// `doktor_randevulari`: patients and times of one doctor's appointments.
    DoctorAppointments,
    /// `kullanicilari_listele`: patients and doctors in one listing.
    ListUsers,
    /// `birden_fazla_hastaya_bakan_doktorlari_listele`
    BusyDoctors,
    /// `tamamlanmis_randevulari_goster`
    CompletedAppointments,
    /// `hasta_randevulari`
    PatientAppointments,
    /// `kullanici_ara`
    SearchUsers,
    /// `hastanin_recetelerini_listele`
    PatientPrescriptions,
}

impl Report {
    pub const ALL: [Report; 7] = [
        Report::DoctorAppointments,
        Report::ListUsers,
        Report::BusyDoctors,
        Report::CompletedAppointments,
        Report::PatientAppointments,
        Report::SearchUsers,
        Report::PatientPrescriptions,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Report::DoctorAppointments => "doktor_randevulari",
            Report::ListUsers => "kullanicilari_listele",
            Report::BusyDoctors => "birden_fazla_hastaya_bakan_doktorlari_listele",
            Report::CompletedAppointments => "tamamlanmis_randevulari_goster",
            Report::PatientAppointments => "hasta_randevulari",
            Report::SearchUsers => "kullanici_ara",
            Report::PatientPrescriptions => "hastanin_recetelerini_listele",
        }
    }

    /// Reports without parameters run as soon as the page is requested.
    pub fn runs_on_load(self) -> bool {
        matches!(
            self,
            Report::ListUsers | Report::BusyDoctors | Report::CompletedAppointments
        )
    }
}

/// A dispatchable route: an entity/operation pair or a named report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Crud(Entity, Operation),
    Report(Report),
}

/// What a GET request on a route does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetBehaviour {
    /// Execute the route's statement without parameters and render the rows.
    Execute,
    /// Render the route's view with no context (an empty form).
    ShowForm,
}

/// View rendered at `/`, also the base every page extends.
pub const LAYOUT_VIEW: &str = "layout";

impl Route {
    /// Every route, CRUD routes first (entity-major), then reports.
    pub fn all() -> Vec<Route> {
        let mut routes = Vec::with_capacity(Entity::ALL.len() * Operation::ALL.len() + 7);
        for entity in Entity::ALL {
            for operation in Operation::ALL {
                routes.push(Route::Crud(entity, operation));
            }
        }
        routes.extend(Report::ALL.into_iter().map(Route::Report));
        routes
    }

    /// Statement key, e.g. `hasta_ekle`.
    pub fn key(self) -> String {
        match self {
            Route::Crud(entity, operation) => format!("{}_{}", entity.table(), operation.suffix()),
            Route::Report(report) => report.key().to_string(),
        }
    }

    /// URL path the dispatcher registers, `/{key}`.
    pub fn path(self) -> String {
        format!("/{}", self.key())
    }

    /// View key; every route renders the view named after its statement key.
    pub fn view(self) -> String {
        self.key()
    }

    pub fn get_behaviour(self) -> GetBehaviour {
        match self {
            Route::Crud(_, Operation::List) => GetBehaviour::Execute,
            Route::Crud(_, _) => GetBehaviour::ShowForm,
            Route::Report(report) if report.runs_on_load() => GetBehaviour::Execute,
            Route::Report(_) => GetBehaviour::ShowForm,
        }
    }

    /// Whether the route answers POST with submitted form values.
    pub fn accepts_post(self) -> bool {
        self.get_behaviour() == GetBehaviour::ShowForm
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Route {
    type Err = HastaneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().trim_start_matches('/');
        Route::all()
            .into_iter()
            .find(|route| route.key() == key)
            .ok_or_else(|| HastaneError::UnknownRoute(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn route_keys_are_unique() {
        let routes = Route::all();
        let keys: HashSet<String> = routes.iter().map(|r| r.key()).collect();
        assert_eq!(keys.len(), routes.len());
        assert_eq!(routes.len(), 27);
    }

    #[test]
    fn crud_keys_follow_table_and_suffix() {
        assert_eq!(
            Route::Crud(Entity::Patient, Operation::Create).key(),
            "hasta_ekle"
        );
        assert_eq!(
            Route::Crud(Entity::Examination, Operation::Update).key(),
            "muayene_guncelle"
        );
        assert_eq!(
            Route::Crud(Entity::Appointment, Operation::List).path(),
            "/randevu_listele"
        );
    }

    #[test]
    fn only_lists_and_parameterless_reports_execute_on_get() {
        let executing: Vec<String> = Route::all()
            .into_iter()
            .filter(|r| r.get_behaviour() == GetBehaviour::Execute)
            .map(|r| r.key())
            .collect();

        assert_eq!(
            executing,
            vec![
                "hasta_listele",
                "doktor_listele",
                "recete_listele",
                "muayene_listele",
                "randevu_listele",
                "kullanicilari_listele",
                "birden_fazla_hastaya_bakan_doktorlari_listele",
                "tamamlanmis_randevulari_goster",
            ]
        );
    }

    #[test]
    fn form_routes_accept_post() {
        assert!(Route::Crud(Entity::Doctor, Operation::Delete).accepts_post());
        assert!(Route::Report(Report::SearchUsers).accepts_post());
        assert!(!Route::Crud(Entity::Doctor, Operation::List).accepts_post());
        assert!(!Route::Report(Report::BusyDoctors).accepts_post());
    }

    #[test]
    fn parses_keys_and_paths() {
        assert_eq!(
            "/recete_sil".parse::<Route>().unwrap(),
            Route::Crud(Entity::Prescription, Operation::Delete)
        );
        assert_eq!(
            "kullanici_ara".parse::<Route>().unwrap(),
            Route::Report(Report::SearchUsers)
        );
        assert!(matches!(
            "hasta_sil_hepsi".parse::<Route>(),
            Err(HastaneError::UnknownRoute(key)) if key == "hasta_sil_hepsi"
        ));
    }
}
