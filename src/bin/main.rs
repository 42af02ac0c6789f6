use voice_command_orchestrator::{
    audit::InMemoryCommandLog,
    response::ResponseRenderer,
    Assistant, AssistantConfig, CommandRequest, CommandSource,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AssistantConfig::from_env()?;

    info!(
        cloud_model = %config.cloud_model,
        local_model = %config.local_model,
        max_workers = config.max_workers,
        "Voice Command Orchestrator starting"
    );

    let command_log = Arc::new(InMemoryCommandLog::new());
    let assistant = Assistant::from_config(&config, command_log.clone())?;

    let samples = [
        ("open notepad", "user", CommandSource::Voice),
        ("delete report.pdf", "user", CommandSource::Text),
        ("delete report.pdf", "admin", CommandSource::Text),
        ("list running applications", "user", CommandSource::Gui),
        ("notepad खोलो", "user", CommandSource::Voice),
        ("tell me a joke", "user", CommandSource::Text),
    ];

    for (text, role, source) in samples {
        let request = CommandRequest {
            text: text.to_string(),
            caller_role: role.to_string(),
            user_id: "demo".to_string(),
            is_online: true,
            source,
            deadline_ms: Some(10_000),
        };

        match assistant.process(request).await {
            Ok(outcome) => {
                println!("\n=== {} ({}) ===", text, role);
                println!(
                    "Intent: {} / {} ({:.2})",
                    outcome.parsed_command.intent.category,
                    outcome.parsed_command.intent.action,
                    outcome.parsed_command.intent.confidence
                );
                if let Some(plan) = &outcome.plan {
                    println!("Plan: {} step(s), ~{} ms", plan.steps.len(), plan.estimated_duration_ms);
                }
                println!("{}", ResponseRenderer::format_for_display(&outcome.response));
            }
            Err(e) => eprintln!("Command '{}' failed: {}", text, e),
        }
    }

    let logged = command_log.list_for_user("demo").await;
    info!(logged = logged.len(), "Demo complete");

    Ok(())
}
