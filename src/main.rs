use anyhow::{bail, Context, Result};
use log::*;
use structopt::StructOpt;

use doctrack::config::{self, Config};
use doctrack::display::render_list;
use doctrack::model::expiry::today;
use doctrack::prompt::{Dmenu, Prompt, Terminal};
use doctrack::{RecordDraft, RecordId, RecordStore};

#[derive(Debug, StructOpt)]
#[structopt(name = "doctrack", about = "Keep track of documents and their expiry dates")]
struct Opt {
    /// Base URL of the document service
    #[structopt(long, env = "DOCTRACK_API_URL")]
    api_url: Option<String>,
    /// Password the operator has to type to unlock
    #[structopt(long, env = "DOCTRACK_PASSWORD", hide_env_values = true)]
    shared_secret: Option<String>,
    /// Where the session token is kept between runs
    #[structopt(long, env = "DOCTRACK_TOKEN_PATH")]
    token_path: Option<String>,
    /// Ask through dmenu instead of the terminal
    #[structopt(long)]
    dmenu: bool,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Unlock and fetch a session token
    Login {
        /// Read from the terminal (or dmenu) when omitted
        #[structopt(long)]
        password: Option<String>,
    },
    /// Forget the session token
    Logout,
    /// Check whether the saved session is still accepted
    Status,
    /// Show documents, most urgent emphasised
    List {
        /// Matches document type or number
        #[structopt(short, long, default_value = "")]
        search: String,
        /// Matches owner name
        #[structopt(short, long, default_value = "")]
        owner: String,
        #[structopt(long)]
        json: bool,
    },
    /// Add a document
    Add(DraftArgs),
    /// Change fields of an existing document
    Edit {
        sno: String,
        #[structopt(flatten)]
        fields: DraftArgs,
    },
    /// Delete a document
    Delete {
        sno: String,
        /// Do not ask for confirmation
        #[structopt(short, long)]
        yes: bool,
    },
}

#[derive(Debug, StructOpt)]
struct DraftArgs {
    #[structopt(long = "type")]
    document_type: Option<String>,
    #[structopt(long)]
    owner: Option<String>,
    #[structopt(long)]
    number: Option<String>,
    /// YYYY-MM-DD
    #[structopt(long)]
    expiry: Option<String>,
    /// Action due date, YYYY-MM-DD
    #[structopt(long)]
    due: Option<String>,
}

impl DraftArgs {
    fn apply(self, mut draft: RecordDraft) -> RecordDraft {
        if let Some(v) = self.document_type {
            draft.document_type = v;
        }
        if let Some(v) = self.owner {
            draft.document_owner = v;
        }
        if let Some(v) = self.number {
            draft.document_number = v;
        }
        if let Some(v) = self.expiry {
            draft.expiry_date = v;
        }
        if let Some(v) = self.due {
            draft.action_due_date = v;
        }
        draft
    }
}

// Main flow
#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let opt = Opt::from_args();
    let config = Config::new(
        opt.api_url.as_deref().unwrap_or(config::DEFAULT_API_URL),
        opt.shared_secret.as_deref().unwrap_or(config::DEFAULT_PASSWORD),
        opt.token_path.as_deref().unwrap_or(config::DEFAULT_TOKEN_PATH),
    )?;
    debug!("Using service at {}", config.api_url);
    let prompt: Box<dyn Prompt> = if opt.dmenu { Box::new(Dmenu) } else { Box::new(Terminal) };

    let store = doctrack::open(&config)?;
    let result = run(&store, prompt.as_ref(), opt.cmd).await;
    store.notices().shutdown();
    result
}

async fn run(store: &RecordStore, prompt: &dyn Prompt, cmd: Cmd) -> Result<()> {
    match cmd {
        Cmd::Login { password } => {
            let password = match password {
                Some(p) => p,
                None => match prompt.secret("Password").context("Unable to read password")? {
                    Some(p) => p,
                    None => bail!("Login cancelled"),
                },
            };
            store.login(&password).await?;
            println!("{}", render_list(&store.records(), today()));
        }
        Cmd::Logout => {
            store.logout();
            println!("Logged out");
        }
        Cmd::Status => {
            resume(store).await?;
            println!("Authenticated against {}, {} documents", store.session().api().base(), store.records().len());
        }
        Cmd::List { search, owner, json } => {
            resume(store).await?;
            store.set_search(&search);
            store.set_owner_filter(&owner);
            let visible = store.visible();
            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                println!("{}", render_list(&visible, today()));
            }
        }
        Cmd::Add(fields) => {
            resume(store).await?;
            store.begin_create();
            let draft = fields.apply(store.view().draft);
            store.create(draft).await?;
            print_success(store);
        }
        Cmd::Edit { sno, fields } => {
            resume(store).await?;
            let record = match store.view().find(&sno) {
                Some(r) => r.clone(),
                None => bail!("No document with id {}", sno),
            };
            store.begin_edit(&record);
            let draft = fields.apply(store.view().draft);
            store.update(&record.sno, draft).await?;
            print_success(store);
        }
        Cmd::Delete { sno, yes } => {
            resume(store).await?;
            let confirmed = |question: &str| {
                yes || prompt.confirm(question).unwrap_or_else(|e| {
                    warn!("Confirmation prompt failed: {}", e);
                    false
                })
            };
            if store.delete(&RecordId::new(sno), confirmed).await? {
                print_success(store);
            } else {
                println!("Nothing deleted");
            }
        }
    }
    Ok(())
}

/// Restore the saved session and wait for the service to vouch for it.
async fn resume(store: &RecordStore) -> Result<()> {
    match store.restore() {
        Some(check) => check.await.context("Session verification task failed")?,
        None => bail!("Not logged in, run `doctrack login` first"),
    }
    if !store.session().is_authenticated() {
        bail!("Authentication expired. Please login again.");
    }
    Ok(())
}

fn print_success(store: &RecordStore) {
    if let Some(message) = store.notices().current_success() {
        println!("{}", message);
    }
}
