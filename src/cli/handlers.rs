use std::{
    io::{Read, Write},
    sync::Arc,
    time::Duration,
};

use anyhow::anyhow;
use tracing::{debug, info};

use crate::{
    chat::{Chat, ChatStreamer, errors::ChatError, prompts::system_prompt_for},
    cli::commands::{ApiArgs, Cli, Command},
    client::{ChatConfig, OpenAiClient, models::chat_models, provider::Provider},
    prompts::{FeedClient, PromptItem, catalog},
    server::{self, AppState},
    store::{FileStore, KeyValueStore, MemoryStore},
    trending::{CacheInfo, SystemClock, TrendingService},
};

/// Typed at the interactive prompt to leave the session
const EXIT_COMMAND: &str = "exit";
/// Typed at the interactive prompt to forget the conversation so far
const CLEAR_COMMAND: &str = "clear";

#[derive(Debug, PartialEq)]
pub enum ExecutionType {
    /// Send a single message and quit
    Once(String),
    /// Read messages from the terminal until `exit`
    Interactive,
}

impl ExecutionType {
    /// A message from the arguments wins over piped stdin; with neither, the session is
    /// interactive.
    pub fn from_input(args: &[String], piped: Option<String>) -> Self {
        if !args.is_empty() {
            return Self::Once(args.join(" "));
        }

        match piped.map(|input| input.trim().to_string()) {
            Some(input) if !input.is_empty() => Self::Once(input),
            _ => Self::Interactive,
        }
    }
}

pub struct CommandHandler<'a> {
    cli: &'a Cli,
    store: Box<dyn KeyValueStore>,
    /// Where `store` keeps its data, for display
    location: String,
}

impl<'a> CommandHandler<'a> {
    pub fn new(cli: &'a Cli) -> anyhow::Result<Self> {
        let (store, location): (Box<dyn KeyValueStore>, String) = if cli.ephemeral {
            (Box::new(MemoryStore::new()), "memory".to_string())
        } else {
            let store = match &cli.cache_dir {
                Some(dir) => FileStore::new(dir),
                None => FileStore::default_location()?,
            };
            let location = store.dir().display().to_string();
            (Box::new(store), location)
        };
        debug!(%location, "Using storage");

        Ok(Self {
            cli,
            store,
            location,
        })
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        match &self.cli.command {
            Command::Serve { host, port } => {
                let state = AppState::new(self.feed(), Arc::new(SystemClock));
                server::serve((host.as_str(), *port), state).await
            }
            Command::Trending { refresh } => self.trending(*refresh).await,
            Command::CacheInfo => {
                self.cache_info();
                Ok(())
            }
            Command::Models { api } => self.models(api).await,
            Command::Configure { api_key, base_url } => {
                ChatConfig::new(api_key, base_url.as_deref())?.save(&self.store)?;
                println!("Configuration saved to {}", self.location);
                Ok(())
            }
            Command::Chat {
                prompt_id,
                model,
                no_stream,
                api,
                message,
            } => {
                let piped = read_piped_stdin()?;
                let session = ChatSession {
                    model: model.as_deref(),
                    stream: !no_stream,
                };
                session
                    .run(
                        self.chat_for(*prompt_id, api).await?,
                        ExecutionType::from_input(message, piped),
                    )
                    .await
            }
        }
    }

    fn feed(&self) -> FeedClient {
        FeedClient::new(self.cli.feed_url.clone())
            .with_ttl(Duration::from_secs(self.cli.feed_ttl))
    }

    fn trending_service(&self) -> TrendingService<&dyn KeyValueStore> {
        TrendingService::new(self.store.as_ref(), Arc::new(SystemClock))
    }

    async fn trending(&self, refresh: bool) -> anyhow::Result<()> {
        let all = self.feed().fetch_prompts().await;
        let service = self.trending_service();
        let trending = if refresh {
            service.refresh_trending(&all)
        } else {
            service.get_trending(&all)
        };

        if trending.is_empty() {
            println!("No prompts available");
        }
        for prompt in &trending {
            println!("{}", describe(prompt));
        }
        Ok(())
    }

    fn cache_info(&self) {
        println!("Storage: {}", self.location);
        println!("{}", describe_cache(&self.trending_service().cache_info()));
    }

    async fn models(&self, api: &ApiArgs) -> anyhow::Result<()> {
        let client = OpenAiClient::new(self.chat_config(api)?);
        let models = chat_models(client.list_models().await?);

        info!(count = models.len(), "Chat models");
        for model in models {
            println!("{}", model.id);
        }
        Ok(())
    }

    /// Stored configuration, overridden by flags and environment
    fn chat_config(&self, api: &ApiArgs) -> Result<ChatConfig, ChatError> {
        ChatConfig::resolve(
            &self.store,
            api.api_key.as_deref(),
            api.base_url.as_deref(),
        )
    }

    async fn chat_for(&self, prompt_id: u32, api: &ApiArgs) -> anyhow::Result<Chat<OpenAiClient>> {
        let all = self.feed().fetch_prompts().await;
        let prompt = catalog::find(&all, prompt_id)
            .ok_or_else(|| anyhow!("Prompt not found: {}", prompt_id))?;
        let config = self.chat_config(api)?;

        eprintln!("Chatting with {}", describe(prompt));
        Ok(Chat::new(OpenAiClient::new(config)).with_system_prompt(system_prompt_for(prompt)))
    }
}

/// `12. Linux Terminal [Development]`
fn describe(prompt: &PromptItem) -> String {
    format!("{:>3}. {} [{}]", prompt.id, prompt.title, prompt.category)
}

fn describe_cache(info: &CacheInfo) -> String {
    match (&info.date, info.age) {
        (Some(date), Some(age)) if info.has_cache => {
            format!("Trending cache from {} ({}h old)", date, age)
        }
        _ => "No trending cache".to_string(),
    }
}

/// Whole stdin when it is piped, `None` on a terminal
fn read_piped_stdin() -> anyhow::Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    debug!("Reading from stdin piped");
    let mut input = String::new();
    std::io::stdin().lock().read_to_string(&mut input)?;
    Ok(Some(input))
}

struct ChatSession<'a> {
    model: Option<&'a str>,
    stream: bool,
}

impl ChatSession<'_> {
    async fn run(
        &self,
        mut chat: Chat<OpenAiClient>,
        execution_type: ExecutionType,
    ) -> anyhow::Result<()> {
        match execution_type {
            ExecutionType::Once(message) => Ok(self.process_request(&mut chat, message).await?),
            ExecutionType::Interactive => self.process_loop(&mut chat).await,
        }
    }

    async fn process_loop(&self, chat: &mut Chat<OpenAiClient>) -> anyhow::Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        loop {
            print!("> ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.read_line(&mut line)? == 0 {
                break;
            }

            let line = line.trim();
            debug!(%line, "New user message");
            match line {
                "" => continue,
                EXIT_COMMAND => break,
                CLEAR_COMMAND => {
                    chat.clear();
                    println!("Conversation cleared");
                    continue;
                }
                _ => {}
            }

            // A failed turn is reported and the session goes on
            if let Err(e) = self.process_request(chat, line.to_string()).await {
                eprintln!("Error: {}", e);
            }
            println!();
        }

        debug!(turns = chat.messages().len() / 2, "Chat finished");
        Ok(())
    }

    async fn process_request(
        &self,
        chat: &mut Chat<OpenAiClient>,
        message: String,
    ) -> Result<(), ChatError> {
        if self.stream {
            chat.send_message_with_stream(self.model, message, ChatStreamer, tokio::io::stdout())
                .await?;
            println!();
        } else {
            let reply = chat.send_message(self.model, message).await?;
            println!("{}", reply.content);
        }
        Ok(())
    }
}
