//! Interface de linha de comando do cutout baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (remove, check, health)
//! e flags globais (--endpoint, --api-key, --timeout, --verbose).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// cutout: remove o fundo de imagens usando um serviço HTTP.
#[derive(Debug, Parser)]
#[command(name = "cutout", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// URL do endpoint de remoção de fundo (sobrepõe CUTOUT_API_URL).
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Chave de API enviada em `x-api-key` (sobrepõe CUTOUT_API_KEY).
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Tempo máximo de espera pela resposta, em segundos.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Envia uma imagem e salva o resultado sem fundo.
    Remove {
        /// Imagem de entrada.
        file: PathBuf,

        /// Arquivo ou diretório de saída (padrão: diretório atual).
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Aceita apenas JPEG, PNG e WEBP.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Valida uma imagem sem enviá-la.
    Check {
        /// Imagem a validar.
        file: PathBuf,

        /// Aceita apenas JPEG, PNG e WEBP.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Consulta o endpoint de saúde do serviço.
    Health,
}
