//! Fragment-based navigation.
//!
//! The route is whatever follows `#` in the front end's URL. `Navigator`
//! plays the role of the browser's hashchange source and `HashRouter` keeps
//! the current route in sync for as long as it lives.

use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub const ROOT_ROUTE: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum View {
    Dashboard,
    StudentList,
    QuestionBank,
    Grading,
    ExportView,
    BackupRestore,
}

pub fn route_from_fragment(fragment: &str) -> String {
    let route = fragment.strip_prefix('#').unwrap_or(fragment);
    if route.is_empty() {
        ROOT_ROUTE.to_string()
    } else {
        route.to_string()
    }
}

pub fn view_for_route(route: &str) -> View {
    match route {
        "/students" => View::StudentList,
        "/questions" => View::QuestionBank,
        "/grading" => View::Grading,
        "/export" => View::ExportView,
        "/settings" => View::BackupRestore,
        _ => View::Dashboard,
    }
}

/// Header caption. Unknown routes get the generic caption even though they
/// render the dashboard.
pub fn header_title(route: &str) -> &'static str {
    match route {
        "/" => "Dashboard Ikhtisar",
        "/students" => "Manajemen Santri",
        "/questions" => "Bank Soal Digital",
        "/grading" => "Penilaian Ujian Lisan",
        "/export" => "Pusat Laporan",
        "/settings" => "Pengaturan & Backup",
        _ => "Sistem Ujian",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub path: &'static str,
    pub label: &'static str,
}

pub const MENU: [MenuItem; 6] = [
    MenuItem { path: "/", label: "Dashboard" },
    MenuItem { path: "/students", label: "Data Santri" },
    MenuItem { path: "/questions", label: "Bank Soal" },
    MenuItem { path: "/grading", label: "Penilaian" },
    MenuItem { path: "/export", label: "Cetak Laporan" },
    MenuItem { path: "/settings", label: "Database & Backup" },
];

pub fn is_active(current: &str, item_path: &str) -> bool {
    current == item_path || (item_path != ROOT_ROUTE && current.starts_with(item_path))
}

type Listener = Box<dyn FnMut(&str)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Source of fragment-change notifications.
pub struct Navigator {
    fragment: String,
    listeners: Rc<RefCell<Listeners>>,
}

impl Navigator {
    pub fn new(initial_fragment: impl Into<String>) -> Self {
        Self {
            fragment: initial_fragment.into(),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&str) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Box::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Listeners run synchronously, in subscription order. Setting the same
    /// fragment again is not a change and notifies nobody.
    pub fn set_fragment(&mut self, fragment: &str) {
        if self.fragment == fragment {
            return;
        }
        self.fragment = fragment.to_string();
        let mut listeners = self.listeners.borrow_mut();
        for (_, listener) in listeners.entries.iter_mut() {
            listener(&self.fragment);
        }
    }

    #[cfg(test)]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// Keeps a listener registered until dropped.
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

pub struct HashRouter {
    current: Rc<RefCell<String>>,
    _subscription: Subscription,
}

impl HashRouter {
    pub fn attach(navigator: &Navigator) -> Self {
        let current = Rc::new(RefCell::new(route_from_fragment(navigator.fragment())));
        let sink = Rc::clone(&current);
        let subscription = navigator.subscribe(move |fragment| {
            *sink.borrow_mut() = route_from_fragment(fragment);
        });
        Self {
            current,
            _subscription: subscription,
        }
    }

    pub fn route(&self) -> String {
        self.current.borrow().clone()
    }

    pub fn view(&self) -> View {
        view_for_route(&self.current.borrow())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_routes_map_to_views() {
        assert_eq!(view_for_route("/"), View::Dashboard);
        assert_eq!(view_for_route("/students"), View::StudentList);
        assert_eq!(view_for_route("/questions"), View::QuestionBank);
        assert_eq!(view_for_route("/grading"), View::Grading);
        assert_eq!(view_for_route("/export"), View::ExportView);
        assert_eq!(view_for_route("/settings"), View::BackupRestore);
    }

    #[test]
    fn unknown_and_empty_routes_fall_back_to_dashboard() {
        assert_eq!(view_for_route("/unknown-path"), View::Dashboard);
        assert_eq!(view_for_route("/grading/5"), View::Dashboard);
        assert_eq!(view_for_route(&route_from_fragment("")), View::Dashboard);
        assert_eq!(view_for_route(&route_from_fragment("#")), View::Dashboard);
        assert_eq!(route_from_fragment("#/grading"), "/grading");
    }

    #[test]
    fn titles_differ_from_view_fallback() {
        assert_eq!(header_title("/grading"), "Penilaian Ujian Lisan");
        assert_eq!(header_title("/nope"), "Sistem Ujian");
    }

    #[test]
    fn menu_highlight_uses_prefix_except_root() {
        assert!(is_active("/", "/"));
        assert!(is_active("/students/12", "/students"));
        assert!(!is_active("/students", "/"));
        assert_eq!(MENU.iter().filter(|m| is_active("/export", m.path)).count(), 1);
    }

    #[test]
    fn router_follows_fragment_changes() {
        let mut nav = Navigator::new("");
        let router = HashRouter::attach(&nav);
        assert_eq!(router.route(), "/");

        nav.set_fragment("#/grading");
        assert_eq!(router.route(), "/grading");
        assert_eq!(router.view(), View::Grading);

        nav.set_fragment("#/unknown-path");
        assert_eq!(router.route(), "/unknown-path");
        assert_eq!(router.view(), View::Dashboard);
    }

    #[test]
    fn dropping_router_unsubscribes() {
        let mut nav = Navigator::new("#/students");
        let router = HashRouter::attach(&nav);
        assert_eq!(router.view(), View::StudentList);
        assert_eq!(nav.listener_count(), 1);
        drop(router);
        assert_eq!(nav.listener_count(), 0);
        nav.set_fragment("#/export");
        assert_eq!(nav.fragment(), "#/export");
    }

    #[test]
    fn repeated_fragment_does_not_notify() {
        let mut nav = Navigator::new("#/");
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let _sub = nav.subscribe(move |_| *counter.borrow_mut() += 1);
        nav.set_fragment("#/");
        nav.set_fragment("#/export");
        nav.set_fragment("#/export");
        assert_eq!(*hits.borrow(), 1);
    }
}
