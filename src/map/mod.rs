pub mod address;
pub mod block;
pub mod cache;
pub mod geometry;
pub mod parser;
pub mod projection;
pub mod renderer;
pub mod source;
pub mod view;

pub use address::{block_offset, BlockAddress};
pub use block::{MapBlock, Polygon, Polyline};
pub use cache::{resolve, BlockCache};
pub use geometry::{BBox, Point16, Point32};
pub use parser::{parse_block, ParseLimits};
pub use projection::{to_geographic, to_planar, Viewport};
pub use renderer::{render, RenderStats};
pub use source::{BlockSource, DirSource, MemorySource};
pub use view::{MapView, Visibility};
