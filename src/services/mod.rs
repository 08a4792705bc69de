pub mod address_resolver;
pub mod map_overlay;
pub mod map_renderer;
pub mod mileage_audit;
pub mod place_table;
pub mod route_resolver;
pub mod warn_writer;

pub use address_resolver::AddressResolver;
pub use map_overlay::{MapOverlay, OverlayText};
pub use map_renderer::{MapRenderer, RenderSettings};
pub use mileage_audit::{MileageAudit, MileageComparison, MileageStatus};
pub use place_table::PlaceTable;
pub use route_resolver::RouteResolver;
pub use warn_writer::WarnWriter;
