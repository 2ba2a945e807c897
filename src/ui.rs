//! Interface de terminal do cutout: spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`SubmitProgress`] acompanha visualmente
//! o envio de uma imagem ao serviço.

use std::path::Path;
use std::time::Duration;

use console::Style;
use cutout::service::HealthResponse;
use cutout::{SourceFile, Status, WorkflowError, WorkflowSnapshot};
use indicatif::{ProgressBar, ProgressStyle};

/// Indicador visual de progresso para uma submissão no terminal.
///
/// Exibe um spinner animado enquanto o serviço processa a imagem e mensagens
/// coloridas para sucesso (verde) e falha (vermelho).
pub struct SubmitProgress {
    // Spinner do indicatif.
    pb: ProgressBar,
    green: Style,
    red: Style,
}

impl SubmitProgress {
    /// Inicia o spinner com o nome do arquivo enviado.
    pub fn start(file_name: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("{}: {file_name}", Status::Submitting));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
        }
    }

    /// Finaliza o spinner e exibe o resultado da submissão.
    pub fn complete(&self, snapshot: &WorkflowSnapshot) {
        self.pb.finish_and_clear();
        let elapsed = snapshot
            .duration_ms()
            .map(|ms| format!(" in {ms}ms"))
            .unwrap_or_default();
        match (&snapshot.status, &snapshot.last_error) {
            (Status::Succeeded, _) => {
                println!("  {} Background removed{elapsed}", self.green.apply_to("✓"));
            }
            (_, Some(err)) => {
                println!("  {} {}: {}", self.red.apply_to("✗"), err.kind, err.message);
            }
            (status, None) => println!("  {status}"),
        }
    }
}

/// Informa onde o resultado foi salvo.
pub fn print_exported(path: &Path) {
    println!(
        "  {} Saved to {}",
        Style::new().green().bold().apply_to("↓"),
        path.display()
    );
}

/// Informa que o arquivo passou na validação.
pub fn print_accepted(source: &SourceFile) {
    println!(
        "  {} {} ({}, {:.1} KB)",
        Style::new().green().bold().apply_to("✓"),
        source.name(),
        source.media_type(),
        source.size() as f64 / 1024.0
    );
}

/// Informa uma rejeição de validação.
pub fn print_rejection(err: &WorkflowError) {
    eprintln!("  {} {err}", Style::new().red().bold().apply_to("✗"));
}

/// Imprime o snapshot do workflow formatado em JSON.
pub fn print_snapshot(snapshot: &WorkflowSnapshot) {
    let style = match snapshot.status {
        Status::Succeeded => Style::new().green(),
        Status::Failed => Style::new().red(),
        _ => Style::new().yellow(),
    };
    println!();
    println!("{}", style.apply_to("─── Workflow ───"));
    println!(
        "{}",
        serde_json::to_string_pretty(snapshot).unwrap_or_default()
    );
}

/// Imprime o estado do serviço.
pub fn print_health(endpoint: &str, health: &HealthResponse) {
    let style = if health.status == "healthy" {
        Style::new().green().bold()
    } else {
        Style::new().yellow().bold()
    };
    println!(
        "  {} {} {} ({endpoint})",
        style.apply_to(&health.status),
        health.service,
        health.version
    );
}
