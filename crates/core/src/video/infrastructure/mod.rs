pub mod glyph_overlay;
pub mod image_dir_sink;
pub mod image_sequence_source;
