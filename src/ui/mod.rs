pub mod popup;

pub use popup::{DetailPopup, Popup, PopupContent};
