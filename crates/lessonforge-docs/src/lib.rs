//! lessonforge-docs — document assembly.
//!
//! Turns generated question data into downloadable artifacts: a `.docx`
//! test paper stitched into a teacher-authored template, a `.pptx` lesson
//! deck built from scratch, and a `.csv` quiz passthrough. All output is
//! in-memory byte buffers; nothing here touches the network.

pub mod csv;
pub mod docx;
pub mod pptx;

pub use csv::render_quiz;
pub use docx::{assemble_test, AssembledTest, DocxTemplate};
pub use pptx::render_deck;
