// Vitali terminal front end.

pub mod tui;
