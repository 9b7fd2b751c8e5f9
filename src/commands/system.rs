pub fn handle_command(input: &str) -> Result<(), String> {
    match input.to_lowercase().as_str() {
        "help" => {
            println!("\n📚 PDF Q&A Assistant:");
            println!("  Load a PDF, then just type your question about it");
            println!("  Examples:");
            println!("    - what is the main conclusion of this report?");
            println!("    - what about the second quarter?");
            println!();

            println!("📄 Document Commands:");
            println!("  load <file.pdf>  - Process a PDF (replaces the current one)");
            println!("  info             - Show the loaded document");
            println!("  clear            - Drop the document and conversation history");
            println!();

            println!("🎭 Perspective Commands:");
            println!("  roles            - List answer perspectives");
            println!("  role <name>      - Switch perspective");
            println!("  Example: role economist, role corporate_lawyer");
            println!();

            println!("⚙️ System Commands:");
            println!("  save  - Save conversation history to a JSON file");
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
            Ok(())
        }
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            std::process::exit(0);
        }
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string()),
    }
}
