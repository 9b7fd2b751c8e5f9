use crate::llm::DocumentIndex;
use colored::Colorize;
use std::path::Path;

pub async fn handle_load(index: &mut DocumentIndex, path: &str) -> Result<(), String> {
    println!("📄 Processing PDF: {}", path.bright_yellow());

    let info = index
        .process_pdf(Path::new(path))
        .await
        .map_err(|e| format!("Error processing PDF: {}", e))?;

    println!(
        "✅ Successfully processed {} into {} chunks",
        info.filename.bright_green(),
        info.total_chunks
    );
    println!("💭 You can now ask questions about the document.");
    Ok(())
}

pub fn handle_info(index: &DocumentIndex) -> Result<(), String> {
    match index.document() {
        Some(info) => {
            println!("\n📄 Loaded Document:");
            println!("  Name:      {}", info.filename.bright_yellow());
            println!("  Path:      {}", info.file_path);
            println!("  Chunks:    {}", info.total_chunks.to_string().bright_green());
            println!("  Processed: {}", info.processed_date.format("%Y-%m-%d %H:%M:%S UTC"));
            Ok(())
        }
        None => {
            println!("No document loaded. Use 'load <file.pdf>' first.");
            Ok(())
        }
    }
}

pub async fn handle_clear(index: &mut DocumentIndex) -> Result<(), String> {
    if index.document().is_none() {
        println!("Nothing to clear.");
        return Ok(());
    }

    index
        .clear()
        .await
        .map_err(|e| format!("Failed to clear document: {}", e))?;

    println!("🗑️ Document and index cleared.");
    Ok(())
}
