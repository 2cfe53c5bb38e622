pub mod pipeline;

pub use pipeline::ConvertPipeline;
