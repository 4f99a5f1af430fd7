//! CampusCard Card Renderer
//!
//! Produces printable student ID cards as PNG images.
//!
//! # Pipeline
//!
//! ```text
//! StudentRecord ──┬── photo fetch + decode ──┐ (placeholder on failure)
//!                 ├── QR payload + encode ───┤ (omitted on failure)
//!                 └── text fields ───────────┤
//!                                            ▼
//!                              CardComposer (layout + palette)
//!                                            │
//!                                            ▼
//!                                 Scene (draw commands)
//!                                            │
//!                                            ▼
//!                                 Rasterizer → PNG bytes
//! ```

pub mod card;
pub mod compositor;
pub mod fonts;
pub mod layout;
pub mod photo;
pub mod qr;
pub mod raster;
pub mod scene;
pub mod theme;

pub use card::{compose_card, render_card, Degradation, RenderOptions, RenderedCard};
pub use photo::PhotoFetcher;
pub use theme::CardTheme;
