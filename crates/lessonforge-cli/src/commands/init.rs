//! The `lessonforge init` command.

use anyhow::Result;

const SAMPLE_CONFIG: &str = r#"# lessonforge configuration
#
# The API key may be given literally or as an env reference.
api_key = "${GEMINI_API_KEY}"

# Model for generation: gemini-2.5-flash-lite, gemini-2.5-flash, gemini-2.5-pro
model = "gemini-2.5-flash"

# 0.0 = factual, 2.0 = creative
temperature = 0.0

# Where usage.json and gems.json live
data_dir = "."

# The .docx template the test generator stitches questions into
template_path = "test_template.docx"
"#;

pub fn execute() -> Result<()> {
    if std::path::Path::new("lessonforge.toml").exists() {
        println!("lessonforge.toml already exists, skipping.");
    } else {
        std::fs::write("lessonforge.toml", SAMPLE_CONFIG)?;
        println!("Created lessonforge.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit lessonforge.toml or export GEMINI_API_KEY");
    println!("  2. Create test_template.docx with the {{{{SUBJECT_TITLE}}}}-style placeholders");
    println!("     and the {{{{MCQ_SECTION}}}} / {{{{SAQ_SECTION}}}} anchors");
    println!("  3. Run: lessonforge test --subject \"Year 7 Science\" --unit \"Unit 2 SAC\" \\");
    println!("          --year 2026 --topic \"Cells\" --rubric \"Criterion 1: ...\"");

    Ok(())
}
