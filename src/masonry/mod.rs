//! Incremental masonry layout, loading and viewing.
//!
//! | Module | Role |
//! |---|---|
//! | [`viewport`] | Breakpoint column count and device-class sizing tables |
//! | [`columns`] | Shortest-column placement and redistribution |
//! | [`scroll`] | Bottom-proximity trigger and event throttle |
//! | [`loader`] | The state machine: tag sessions, batches, one fetch at a time |
//! | [`viewer`] | Full-screen navigation within the active list |
//! | [`driver`] | Synchronous host loop for native callers |

pub mod columns;
pub mod driver;
pub mod loader;
pub mod scroll;
pub mod viewer;
pub mod viewport;

pub use columns::{Column, ColumnSet, PlacedImage, aspect_contribution};
pub use driver::{ImageFetcher, StoreFetcher, drive, serve_viewer};
pub use loader::{
    Attempt, FetchOutcome, FetchRequest, LoadCursor, LoaderEvent, LoaderSettings, LoaderState,
    MasonryLoader, Ticket,
};
pub use scroll::{ScrollMetrics, ScrollThrottle};
pub use viewer::{
    ExifData, ViewToken, Viewer, ViewerCommand, ViewerInput, ViewerKey, ViewerState,
};
pub use viewport::{DeviceClass, Viewport};
