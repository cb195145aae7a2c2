mod ballot;
mod commands;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod voting;

use config::Config;
use db::{Database, VoteStore};
use log::{error, info};
use serenity::async_trait;
use serenity::model::application::command::Command;
use serenity::model::application::interaction::Interaction;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

struct Bot {
    store: Arc<dyn VoteStore>,
}

#[async_trait]
impl EventHandler for Bot {
    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let store = Arc::clone(&self.store);

        // Each interaction runs on its own task against a fresh snapshot
        tokio::spawn(async move {
            handlers::handle_interaction(store.as_ref(), &ctx, interaction).await;
        });
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        let commands = Command::set_global_application_commands(&ctx.http, |builder| {
            commands::register_all(builder)
        })
        .await;

        if let Err(why) = commands {
            error!("Failed to register slash commands: {:?}", why);
        } else {
            info!("Successfully registered global slash commands.");
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };

    let store: Arc<dyn VoteStore> = match Database::connect(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };
    info!("Vote store ready at {}", config.database_url);

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_INTEGRATIONS;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Bot { store })
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("Error creating client: {:?}", e);
            return;
        }
    };

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }
}
