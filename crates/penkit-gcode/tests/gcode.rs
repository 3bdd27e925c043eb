#[path = "gcode/pipeline.rs"]
mod pipeline;
#[path = "gcode/postprocess.rs"]
mod postprocess;
