//! Completion backend check

use anyhow::Result;
use smartspend_core::ai::DEFAULT_MODEL;
use smartspend_core::{AIBackend, AIClient};

pub async fn cmd_check() -> Result<()> {
    println!("🔍 Checking completion backend...\n");

    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "groq".to_string());
    println!("  AI_BACKEND: {}", backend);

    let Some(client) = AIClient::from_env() else {
        println!("\n⚠️  No completion backend configured.");
        println!("   Recommendations will use the local fallback.");
        println!("\nTo use Groq:");
        println!("  export GROQ_API_KEY=gsk_...");
        println!("  export GROQ_MODEL={}   # optional", DEFAULT_MODEL);
        println!("\nTo use another OpenAI-compatible server:");
        println!("  export AI_BACKEND=openai_compatible");
        println!("  export OPENAI_COMPATIBLE_HOST=http://localhost:8000");
        println!("  export OPENAI_COMPATIBLE_MODEL=<model>");
        return Ok(());
    };

    println!("  Host: {}", client.host());
    println!("  Model: {}\n", client.model());

    print!("Checking availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!("\n⚠️  Could not reach {}", client.host());
        println!("   Check the API key and network access; recommendations will fall back locally.");
    }

    Ok(())
}
