use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::prompts::feed::{FEED_TTL, FEED_URL};

/// Browse trending AI prompt templates and chat with them from the terminal or over HTTP.
#[derive(Parser, Debug)]
#[command(name = "promptdeck", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// URL of the JSON feed listing every prompt template
    #[arg(long, env = "PROMPTDECK_FEED_URL", default_value = FEED_URL, global = true)]
    pub feed_url: String,

    /// Seconds a downloaded feed is reused before fetching it again
    #[arg(long, env = "PROMPTDECK_FEED_TTL", default_value_t = FEED_TTL.as_secs(), global = true)]
    pub feed_ttl: u64,

    /// Directory for the trending cache and the chat configuration
    #[arg(long, env = "PROMPTDECK_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Keep the cache and configuration in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Serve the prompt directory over HTTP
    Serve {
        /// Address to bind
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,
        /// Port to bind
        #[arg(short, long, env = "PORT", default_value_t = 3000)]
        port: u16,
    },
    /// Show today's trending prompts
    Trending {
        /// Discard the cached selection and generate it again
        #[arg(short, long)]
        refresh: bool,
    },
    /// Show what the trending cache holds
    CacheInfo,
    /// List the chat models of the configured API
    Models {
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Store the API key and base URL on this device
    Configure {
        #[arg(long)]
        api_key: String,
        /// Defaults to the OpenAI API
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Chat with a prompt template as the system prompt
    Chat {
        /// Id of the prompt template
        #[arg(short = 'i', long)]
        prompt_id: u32,
        /// Model to use, default: gpt-4o-mini
        #[arg(short, long)]
        model: Option<String>,
        /// Wait for the whole reply instead of streaming it
        #[arg(long)]
        no_stream: bool,
        #[command(flatten)]
        api: ApiArgs,
        /// Message to send; without one an interactive session starts
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

/// Per-run overrides of the stored chat configuration
#[derive(Args, Debug, PartialEq, Default)]
pub struct ApiArgs {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_args() {
        let req = vec!["promptdeck", "chat", "-i", "12", "tell", "me", "a", "story"];
        let cli = Cli::parse_from(req);

        match cli.command {
            Command::Chat {
                prompt_id,
                model,
                no_stream,
                message,
                ..
            } => {
                assert_eq!(prompt_id, 12);
                assert!(model.is_none());
                assert!(!no_stream);
                assert_eq!(message, vec!["tell", "me", "a", "story"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_chat_without_message() {
        let req = vec!["promptdeck", "chat", "--prompt-id", "3", "--no-stream", "-m", "gpt-4o"];
        let cli = Cli::parse_from(req);

        match cli.command {
            Command::Chat {
                model,
                no_stream,
                message,
                ..
            } => {
                assert_eq!(model.as_deref(), Some("gpt-4o"));
                assert!(no_stream);
                assert!(message.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_serve_args() {
        let req = vec!["promptdeck", "serve", "--host", "127.0.0.1", "--port", "8080"];
        let cli = Cli::parse_from(req);

        assert_eq!(
            cli.command,
            Command::Serve {
                host: "127.0.0.1".to_string(),
                port: 8080
            }
        );
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let req = vec![
            "promptdeck",
            "trending",
            "--refresh",
            "--ephemeral",
            "--feed-url",
            "http://localhost:9000/feed.json",
        ];
        let cli = Cli::parse_from(req);

        assert_eq!(cli.command, Command::Trending { refresh: true });
        assert!(cli.ephemeral);
        assert_eq!(cli.feed_url, "http://localhost:9000/feed.json");
        assert_eq!(cli.feed_ttl, 300);
    }

    #[test]
    fn test_prompt_id_is_required() {
        assert!(Cli::try_parse_from(["promptdeck", "chat", "hello"]).is_err());
        assert!(Cli::try_parse_from(["promptdeck", "chat", "-i", "abc"]).is_err());
    }
}
