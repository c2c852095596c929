use crate::model::{Group, Student};

const SEED_ROSTER: &[(&str, Group)] = &[
    ("Ahmad Fauzan", Group::A),
    ("Muhammad Rizki Ramadhan", Group::A),
    ("Abdullah Hanif", Group::A),
    ("Faris Al Farisi", Group::A),
    ("Hafidz Nur Ikhsan", Group::A),
    ("Ilham Maulana", Group::B),
    ("Khairul Anam", Group::B),
    ("Luthfi Hakim", Group::B),
    ("Naufal Azzam", Group::B),
    ("Rafi Akbar", Group::B),
    ("Salman Alfarizi", Group::C),
    ("Umar Abdul Aziz", Group::C),
    ("Yusuf Habibi", Group::C),
    ("Zaki Mubarak", Group::C),
    ("Zidan Firdaus", Group::C),
];

/// Class 5C roster used on first start or when the stored roster is unreadable.
pub fn initial_students() -> Vec<Student> {
    SEED_ROSTER
        .iter()
        .enumerate()
        .map(|(i, (name, group))| Student::new(i as u64 + 1, *name, *group))
        .collect()
}
