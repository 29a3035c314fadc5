use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{Config, OutputFormat};
use crate::host::{
    ClickTarget, ConsoleNotifier, ControlKey, FieldFeedback, FieldValidations, FixedSelection,
    HandlerRegistry, Host, HtmlRenderer, HttpTransport, Localizer, MessageCatalog,
};
use crate::jenkins::{project, FieldState, JenkinsWidget, JobNameValidator, TriggerOutcome};
use crate::model::{Subscription, PARAMETER_JOB, PARAMETER_URL};
use crate::output::{self, Spinner};

#[derive(Parser)]
#[command(name = "jenkins-widget")]
#[command(author, version, about = "Jenkins build job widget", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file, searched in the current directory when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Console REST base URL
    #[arg(long, global = true, env = "JENKINS_WIDGET_REST_URL")]
    rest_url: Option<String>,

    #[arg(short, long, global = true, env = "JENKINS_WIDGET_USER")]
    user: Option<String>,

    #[arg(long, global = true, env = "JENKINS_WIDGET_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Message locale (en, fr)
    #[arg(short, long, global = true)]
    locale: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status of a subscription read from a JSON file
    Render {
        #[arg(short, long)]
        subscription: PathBuf,

        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Launch the build of a subscription's job
    Build {
        subscription: u64,

        /// Job name used in the notification
        #[arg(short, long)]
        job: Option<String>,
    },
    /// Check the name of a job to create
    CheckName {
        name: String,

        /// Project key the name must start with
        #[arg(short, long)]
        pkey: Option<String>,

        /// Node the job is looked up on
        #[arg(short, long)]
        node: Option<String>,
    },
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(rest_url) = &self.rest_url {
            config.rest.base_url.clone_from(rest_url);
        }
        if self.user.is_some() {
            config.rest.user.clone_from(&self.user);
        }
        if self.api_token.is_some() {
            config.rest.api_token.clone_from(&self.api_token);
        }
        if let Some(locale) = &self.locale {
            config.output.locale.clone_from(locale);
        }
        Ok(config)
    }

    fn host(config: &Config, node: Option<String>) -> Result<(Host, Arc<FieldValidations>)> {
        let messages: Arc<dyn Localizer> =
            Arc::new(MessageCatalog::for_locale(&config.output.locale));
        let notifier = Arc::new(ConsoleNotifier);
        let validation = Arc::new(FieldValidations::default());

        let mut transport =
            HttpTransport::new(&config.rest.base_url)?.with_notifier(notifier.clone());
        if let (Some(user), Some(token)) = (&config.rest.user, &config.rest.api_token) {
            transport = transport.with_basic_auth(user, token);
        }

        let host = Host {
            renderer: Arc::new(HtmlRenderer::new(messages.clone())),
            messages,
            validation: validation.clone(),
            transport: Arc::new(transport),
            selection: Arc::new(FixedSelection(node.or_else(|| config.project.node.clone()))),
            notifier,
            view: Arc::new(HandlerRegistry::default()),
        };
        Ok((host, validation))
    }

    fn execute_render(
        config: &Config,
        subscription: &Path,
        format: Option<OutputFormat>,
    ) -> Result<()> {
        let contents = std::fs::read_to_string(subscription)
            .with_context(|| format!("Failed to read subscription: {}", subscription.display()))?;
        let subscription: Subscription = serde_json::from_str(&contents)
            .context("Failed to parse subscription")?;

        let (host, _) = Self::host(config, None)?;
        let pkey = config.project.pkey.clone().unwrap_or_default();
        let widget = JenkinsWidget::new(host.clone(), pkey);

        match format.unwrap_or(config.output.format) {
            OutputFormat::Table => {
                let base_url = subscription.parameter(PARAMETER_URL).unwrap_or_default();
                let projection = project(&subscription, base_url, host.messages.as_ref());
                println!("{}", output::render_projection(&subscription, &projection));
            }
            OutputFormat::Html => {
                println!("{}", widget.render_details_key(&subscription));
                println!("{}", widget.render_features(&subscription));
                println!("{}", widget.render_details_features(&subscription).html);
            }
            OutputFormat::Json => {
                let base_url = subscription.parameter(PARAMETER_URL).unwrap_or_default();
                let projection = project(&subscription, base_url, host.messages.as_ref());
                println!("{}", serde_json::to_string_pretty(&projection)?);
            }
        }
        Ok(())
    }

    async fn execute_build(
        config: &Config,
        subscription: u64,
        job: Option<String>,
    ) -> Result<()> {
        let (host, _) = Self::host(config, None)?;
        let widget = JenkinsWidget::new(host, config.project.pkey.clone().unwrap_or_default());

        let key = ControlKey::job(subscription);
        info!("Launching build for {key:?}");

        let spinner = Spinner::start(&format!("Launching build of subscription {subscription}"));
        let handle = widget
            .on_build_click(ClickTarget { key, job_name: job })
            .context("No async runtime available")?;

        match handle.await? {
            TriggerOutcome::Triggered => spinner.succeed("Build launched"),
            TriggerOutcome::Failed => {
                spinner.fail("Build failed");
                anyhow::bail!("Launching the build of subscription {subscription} failed");
            }
            TriggerOutcome::Ignored => spinner.fail("A build request is already running"),
        }
        Ok(())
    }

    async fn execute_check_name(
        config: &Config,
        name: &str,
        pkey: Option<&str>,
        node: Option<String>,
    ) -> Result<()> {
        let pkey = pkey
            .map(str::to_string)
            .or_else(|| config.project.pkey.clone())
            .context("A project key is required, use --pkey or the [project] configuration")?;

        let (host, validation) = Self::host(config, node)?;
        let messages = host.messages.clone();
        let validator = JobNameValidator::from_host(&pkey, &host)?;

        let result = validator.validate_name(name);
        let state = match result.check {
            Some(check) => {
                let spinner = Spinner::start(&format!("Checking job {name}"));
                let state = check.await?;
                spinner.succeed("Checked");
                state
            }
            None => validator.state(),
        };

        match (state, validation.get(PARAMETER_JOB)) {
            (FieldState::Invalid, Some(FieldFeedback::Error { rule, parameters })) => {
                let message = messages
                    .format_parameters(&rule, &parameters)
                    .unwrap_or_else(|| format!("{rule}: {}", parameters.join(", ")));
                eprintln!("{} {message}", output::failure("✗"));
                anyhow::bail!("Job name {name} is not valid");
            }
            (FieldState::Unchecked, _) if result.accepted => {
                eprintln!(
                    "{} {name} matches the naming rules, existence not checked (no node)",
                    output::muted("?")
                );
            }
            _ => eprintln!("{} {name} is available", output::success("✓")),
        }
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;
        match &self.command {
            Commands::Render {
                subscription,
                format,
            } => Self::execute_render(&config, subscription, *format),
            Commands::Build { subscription, job } => {
                Self::execute_build(&config, *subscription, job.clone()).await
            }
            Commands::CheckName { name, pkey, node } => {
                Self::execute_check_name(&config, name, pkey.as_deref(), node.clone()).await
            }
        }
    }
}
