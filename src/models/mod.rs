pub mod address;
pub mod artifact;
pub mod batch;
pub mod loaders;
pub mod record;
pub mod route;
pub mod static_map;

pub use address::{GeocodeResult, ResolutionTier, ResolvedAddress};
pub use artifact::{MapArtifact, RenderTier};
pub use batch::{BatchRequest, BatchResult};
pub use loaders::{load_batch_request, load_place_table, write_batch_result};
pub use record::{fields, ComputedFields, TravelRecord};
pub use route::{DirectionsRoute, RouteDetail, RouteLeg, RouteStep};
pub use static_map::{MarkerStyle, PathStyle, StaticMapRequest};
