//! AdVision CLI
//!
//! Command-line front end for the AdVision marketing backend:
//! - Sign in and manage the stored session
//! - Manage campaigns, ad copy, and images
//! - Generate content, run A/B tests, and pull reports

use advision::client::{ApiClient, ApiError, AuthFailure, ClientConfig};
use advision::config::Config;
use advision::resources::{
    AdPlatform, CampaignInput, ImageGenerationRequest, NewAbTest, NewApiKey, ProfileUpdate,
    RegistrationOutcome, ResourceId, SaveImageRequest, TextGenerationRequest, VariationInput,
};
use advision::session::FileTokenStore;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "advision")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "AI-assisted ad campaign management from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend API URL (overrides config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(long, env = "ADVISION_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        email: String,
        #[arg(long, env = "ADVISION_PASSWORD", hide_env_values = true)]
        password: String,
        /// Password confirmation
        #[arg(long, env = "ADVISION_PASSWORD_CONFIRM", hide_env_values = true)]
        confirm: String,
    },

    /// Print the Google sign-in URL
    GoogleUrl,

    /// Finish Google sign-in with the code from the redirect
    GoogleLogin {
        code: String,
        /// Redirect URI registered with Google (default: config)
        #[arg(long)]
        redirect_uri: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show session and backend status
    Status,

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Dashboard totals
    Dashboard,

    /// Pull campaigns from connected ad platforms
    Sync,

    /// Manage campaigns
    Campaigns {
        #[command(subcommand)]
        action: CampaignAction,
    },

    /// Ad copy library and generation
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },

    /// Image library and generation
    Images {
        #[command(subcommand)]
        action: ImageAction,
    },

    /// Campaign performance analytics
    Analytics {
        campaign: ResourceId,
        /// Print the per-day series
        #[arg(long)]
        daily: bool,
    },

    /// Audience insights for a campaign
    Audience { campaign: ResourceId },

    /// A/B tests
    AbTests {
        #[command(subcommand)]
        action: AbTestAction,
    },

    /// Ad platform API keys
    ApiKeys {
        #[command(subcommand)]
        action: ApiKeyAction,
    },

    /// Weekly performance report
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProfileAction {
    Show,
    Update {
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
}

#[derive(clap::Args)]
pub struct CampaignFields {
    /// Campaign title
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
    #[arg(long)]
    platform: Option<String>,
    #[arg(long)]
    budget: Option<f64>,
}

impl CampaignFields {
    fn apply(self, input: &mut CampaignInput) {
        if let Some(title) = self.title {
            input.title = title;
        }
        if self.description.is_some() {
            input.description = self.description;
        }
        if self.start.is_some() {
            input.start_date = self.start;
        }
        if self.end.is_some() {
            input.end_date = self.end;
        }
        if let Some(platform) = self.platform {
            input.platform = platform;
        }
        if self.budget.is_some() {
            input.budget = self.budget;
        }
    }
}

#[derive(Subcommand)]
pub enum CampaignAction {
    List,
    Show {
        id: ResourceId,
    },
    Create {
        #[command(flatten)]
        fields: CampaignFields,
    },
    /// Edit a campaign; omitted fields keep their current value
    Update {
        id: ResourceId,
        #[command(flatten)]
        fields: CampaignFields,
    },
    Delete {
        id: ResourceId,
    },
    /// Comment on a campaign
    Comment {
        id: ResourceId,
        message: String,
    },
    /// Delete a comment
    Uncomment {
        comment_id: ResourceId,
    },
}

#[derive(Subcommand)]
pub enum ContentAction {
    List,
    Delete {
        id: ResourceId,
    },
    /// Generate ad copy variations for a campaign
    Generate {
        campaign: ResourceId,
        prompt: String,
        #[arg(long, default_value = "persuasive")]
        tone: String,
        #[arg(long, default_value = "instagram")]
        platform: String,
        #[arg(long, default_value_t = 3)]
        variations: u32,
    },
}

#[derive(Subcommand)]
pub enum ImageAction {
    List,
    Delete {
        id: ResourceId,
    },
    /// Change the stored prompt of an image
    Edit {
        id: ResourceId,
        prompt: String,
    },
    /// Generate candidate images for a campaign
    Generate {
        campaign: ResourceId,
        prompt: String,
        #[arg(long, default_value = "professional")]
        style: String,
        #[arg(long, default_value = "1:1")]
        aspect_ratio: String,
        #[arg(long, default_value = "modern")]
        template: String,
        #[arg(long)]
        headline: Option<String>,
        #[arg(long)]
        tagline: Option<String>,
        #[arg(long)]
        cta: Option<String>,
        /// Render the image without overlay text
        #[arg(long)]
        no_text: bool,
        /// Save every generated image to the campaign
        #[arg(long)]
        save: bool,
    },
    /// Save an image (data URL or base64 read from a file) to a campaign
    Save {
        campaign: ResourceId,
        file: PathBuf,
        #[arg(long, default_value = "upload")]
        provider: String,
        #[arg(long, default_value = "")]
        prompt: String,
    },
}

#[derive(Subcommand)]
pub enum AbTestAction {
    List,
    Create {
        campaign: ResourceId,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Metric deciding the winner (ctr, conversions, engagement)
        #[arg(long, default_value = "ctr")]
        metric: String,
        /// Variation names (default: A and B)
        #[arg(long = "variation")]
        variations: Vec<String>,
    },
    Start {
        id: ResourceId,
    },
    Analyze {
        id: ResourceId,
    },
}

#[derive(Subcommand)]
pub enum ApiKeyAction {
    List,
    Add {
        /// google_ads, facebook_ads, instagram_ads, tiktok_ads, linkedin_ads
        platform: AdPlatform,
        name: String,
        #[arg(long, env = "ADVISION_AD_API_KEY", hide_env_values = true)]
        api_key: String,
        #[arg(long, env = "ADVISION_AD_API_SECRET", hide_env_values = true)]
        api_secret: Option<String>,
        #[arg(long)]
        account_id: Option<String>,
        /// Google Ads developer token
        #[arg(long, env = "ADVISION_AD_DEVELOPER_TOKEN", hide_env_values = true)]
        developer_token: Option<String>,
    },
    Delete {
        id: ResourceId,
    },
    Verify {
        id: ResourceId,
    },
    /// Activate or deactivate a key
    Toggle {
        id: ResourceId,
    },
}

#[derive(Subcommand)]
pub enum ReportAction {
    Show,
    /// Export the weekly report as PDF
    Pdf {
        /// Output file (default: advision_weekly_report_<date>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ApiError>() {
                Some(api) => {
                    eprintln!("Error: {}", api.user_message());
                    if let Some(hint) = sign_in_hint(api) {
                        eprintln!("{}", hint);
                    }
                }
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

/// Follow-up advice for failures that ended the stored session
fn sign_in_hint(error: &ApiError) -> Option<&'static str> {
    match error {
        ApiError::Unauthorized {
            cause: AuthFailure::Rejected,
            ..
        } => None,
        e if e.is_auth_failure() => Some("Your session has expired; run `advision login`."),
        _ => None,
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    advision::logging::init(&config.logging);

    let token_path = config
        .auth
        .token_path()
        .context("cannot determine where to store the session; set ADVISION_TOKEN_FILE")?;
    let tokens = Arc::new(FileTokenStore::new(token_path));
    let client = ApiClient::new(ClientConfig::from(&config.api), tokens)?;
    let format = cli.format;

    match cli.command {
        Commands::Login { email, password } => {
            client.auth().login(&email, &password).await?;
            println!("Signed in as {}", email);
        }

        Commands::Register {
            email,
            password,
            confirm,
        } => match client.auth().register(&email, &password, &confirm).await? {
            RegistrationOutcome::SignedIn => println!("Account created. Signed in as {}", email),
            RegistrationOutcome::LoginRequired => {
                println!("Account created. Check your inbox, then run `advision login {}`", email)
            }
        },

        Commands::GoogleUrl => {
            let client_id = config
                .auth
                .google_client_id
                .as_deref()
                .context("no Google client id configured; set ADVISION_GOOGLE_CLIENT_ID")?;
            println!(
                "{}",
                advision::resources::google_authorization_url(
                    client_id,
                    &config.auth.oauth_redirect_uri
                )
            );
        }

        Commands::GoogleLogin { code, redirect_uri } => {
            let redirect_uri = redirect_uri.unwrap_or_else(|| config.auth.oauth_redirect_uri.clone());
            client.auth().login_with_google(&code, &redirect_uri).await?;
            println!("Signed in with Google");
        }

        Commands::Logout => {
            client.auth().logout().await?;
            println!("Signed out");
        }

        Commands::Status => {
            println!("AdVision v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("API: {}", client.config().base_url);
            if client.auth().is_authenticated().await? {
                let profile = client.profile().get().await?;
                println!("Session: signed in as {}", profile.email);
            } else {
                println!("Session: not signed in");
                println!();
                println!("Sign in with:");
                println!("  advision login you@example.com");
            }
        }

        Commands::Profile { action } => match action {
            ProfileAction::Show => {
                let profile = client.profile().get().await?;
                emit(format, &profile, || {
                    println!("Email: {}", profile.email);
                    println!("Role:  {}", profile.role.as_deref().unwrap_or("-"));
                    println!("Bio:   {}", profile.bio.as_deref().unwrap_or("-"));
                })?;
            }
            ProfileAction::Update { bio, role } => {
                let update = ProfileUpdate { bio, role };
                if update.is_empty() {
                    bail!("nothing to update; pass --bio and/or --role");
                }
                client.profile().update(&update).await?;
                println!("Profile updated");
            }
        },

        Commands::Dashboard => {
            let stats = client.dashboard().stats().await?;
            emit(format, &stats, || {
                println!("Campaigns:  {} ({} active)", stats.total_campaigns, stats.active_campaigns);
                println!("Ads:        {}", stats.total_ads);
                println!("Images:     {}", stats.total_images);
                println!("Budget:     ${:.2}", stats.total_budget.unwrap_or(0.0));
            })?;
        }

        Commands::Sync => {
            let report = client.dashboard().sync_campaigns().await?;
            emit(format, &report, || {
                if let Some(summary) = &report.summary {
                    println!(
                        "Synced {}/{} platforms",
                        summary.successful, summary.total_platforms
                    );
                }
                for result in &report.results {
                    if result.success {
                        println!(
                            "  {:<16} {:<20} {} campaigns",
                            result.platform,
                            result.api_key_name,
                            result.synced_campaigns.unwrap_or(0)
                        );
                    } else {
                        println!(
                            "  {:<16} {:<20} failed: {}",
                            result.platform,
                            result.api_key_name,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                }
                if let Some(error) = &report.error {
                    println!("{}", error);
                }
            })?;
        }

        Commands::Campaigns { action } => campaigns(&client, format, action).await?,
        Commands::Content { action } => content(&client, format, action).await?,
        Commands::Images { action } => images(&client, format, action).await?,

        Commands::Analytics { campaign, daily } => {
            let summary = client.analytics().summary(&campaign).await?;
            emit(format, &summary, || {
                println!("{} ({})", summary.campaign_name, summary.platform);
                println!(
                    "{} days active, {} ads, {} images",
                    summary.days_active, summary.ad_count, summary.image_count
                );
                println!();
                println!("Impressions:  {:.0}", summary.total_impressions);
                println!("Clicks:       {:.0}", summary.total_clicks);
                println!("Conversions:  {:.0}", summary.total_conversions);
                println!("Spend:        ${:.2}", summary.total_spend);
                println!("CTR:          {:.2}%", summary.avg_ctr);
                println!("CPC:          ${:.2}", summary.avg_cpc);
                println!("ROAS:         {:.2}x", summary.roas);
                println!("Score:        {:.0}/100", summary.performance_score);

                if daily {
                    println!();
                    println!(
                        "{:<12} | {:>11} | {:>7} | {:>11} | {:>9} | {:>6}",
                        "Date", "Impressions", "Clicks", "Conversions", "Spend", "CTR"
                    );
                    println!("{}", "-".repeat(72));
                    let cell = |v: Option<f64>, precision: usize| {
                        v.map(|v| format!("{:.*}", precision, v))
                            .unwrap_or_else(|| "-".to_string())
                    };
                    for point in summary.daily_series() {
                        println!(
                            "{:<12} | {:>11} | {:>7} | {:>11} | {:>9} | {:>6}",
                            point.date,
                            cell(point.impressions, 0),
                            cell(point.clicks, 0),
                            cell(point.conversions, 0),
                            cell(point.spend, 2),
                            cell(point.ctr, 2)
                        );
                    }
                }
            })?;
        }

        Commands::Audience { campaign } => {
            let insights = client.audience().insights(&campaign).await?;
            emit(format, &insights, || {
                println!("Reach:       {}", insights.total_reach);
                println!("Engaged:     {}", insights.engaged_users);
                println!(
                    "Engagement:  {:.1}% ({})",
                    insights.engagement_rate.unwrap_or(0.0),
                    insights.engagement_change.as_deref().unwrap_or("-")
                );
                print_named_list("Age groups", &insights.age_groups, "range", "engagement");
                print_named_list("Interests", &insights.interests, "name", "score");
                print_named_list("Top locations", &insights.top_locations, "city", "percentage");
                print_named_list("Best times", &insights.best_times, "day", "time");
                print_named_list("Recommendations", &insights.recommendations, "priority", "message");
                if let Some(note) = &insights.data_note {
                    println!();
                    println!("Note: {}", note);
                }
            })?;
        }

        Commands::AbTests { action } => ab_tests(&client, format, action).await?,
        Commands::ApiKeys { action } => api_keys(&client, format, action).await?,

        Commands::Report { action } => match action {
            ReportAction::Show => {
                let report = client.reports().weekly().await?;
                emit(format, &report, || {
                    println!("Weekly report: {}", report.period_label());
                    println!();
                    let s = &report.summary;
                    println!("Campaigns created:  {}", s.campaigns_created);
                    println!("Ads generated:      {}", s.ads_generated);
                    println!("Images generated:   {}", s.images_generated);
                    println!("Active campaigns:   {}", s.active_campaigns);
                    println!(
                        "Engagement:         {} ({})",
                        s.total_engagement,
                        s.engagement_growth.as_deref().unwrap_or("-")
                    );
                    let i = &report.insights;
                    println!();
                    println!(
                        "Top platform:       {}",
                        i.top_performing_platform.as_deref().unwrap_or("-")
                    );
                    println!("Top campaign:       {}", i.top_campaign().unwrap_or("-"));
                    println!("Average CTR:        {:.2}%", i.avg_ctr.unwrap_or(0.0));

                    if !report.recommendations.is_empty() {
                        println!();
                        println!("Recommendations:");
                        for rec in &report.recommendations {
                            println!("  [{}] {}: {}", rec.priority, rec.title, rec.description);
                        }
                    }
                    if !report.next_steps.is_empty() {
                        println!();
                        println!("Next steps:");
                        for (n, step) in report.next_steps.iter().enumerate() {
                            println!("  {}. {}", n + 1, step);
                        }
                    }
                })?;
            }
            ReportAction::Pdf { output } => {
                let pdf = client.reports().export_pdf().await?;
                let path = output.unwrap_or_else(|| PathBuf::from(&pdf.filename));
                std::fs::write(&path, &pdf.bytes)
                    .with_context(|| format!("failed to write {:?}", path))?;
                println!("Report saved to {:?} ({} bytes)", path, pdf.bytes.len());
            }
        },

        Commands::Config { output } => {
            let content = advision::config::generate_default_config();
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

async fn campaigns(client: &ApiClient, format: Format, action: CampaignAction) -> anyhow::Result<()> {
    match action {
        CampaignAction::List => {
            let campaigns = client.campaigns().list().await?;
            emit(format, &campaigns, || {
                if campaigns.is_empty() {
                    println!("No campaigns yet.");
                    println!();
                    println!("Create your first campaign with:");
                    println!("  advision campaigns create --title \"Spring Sale\"");
                    return;
                }
                println!(
                    "{:<8} {:<30} {:<12} {:<12} {:>10}",
                    "ID", "Title", "Platform", "Start", "Budget"
                );
                println!("{}", "-".repeat(76));
                for c in &campaigns {
                    println!(
                        "{:<8} {:<30} {:<12} {:<12} {:>10}",
                        c.id,
                        truncate(&c.title, 30),
                        c.platform,
                        c.start_date.map(|d| d.to_string()).unwrap_or_else(|| "-".into()),
                        c.budget.map(|b| format!("{:.2}", b)).unwrap_or_else(|| "-".into())
                    );
                }
            })?;
        }
        CampaignAction::Show { id } => {
            let c = client.campaigns().get(&id).await?;
            emit(format, &c, || {
                println!("{} [{}]", c.title, c.id);
                if let Some(description) = &c.description {
                    println!("{}", description);
                }
                println!();
                println!("Platform: {}", c.platform);
                if let (Some(start), Some(end)) = (c.start_date, c.end_date) {
                    println!("Runs:     {} to {}", start, end);
                }
                if let Some(budget) = c.budget {
                    println!("Budget:   ${:.2}", budget);
                }
                println!();
                println!("Ad copy ({}):", c.ad_content.len());
                for ad in &c.ad_content {
                    println!("  [{}] {}", ad.id, truncate(&ad.text, 70));
                }
                println!("Images ({}):", c.images.len());
                for image in &c.images {
                    println!("  [{}] {}", image.id, image.image_url);
                }
                println!("Comments ({}):", c.comments.len());
                for comment in &c.comments {
                    let author = comment.user.as_ref().map(|u| u.email.as_str()).unwrap_or("?");
                    println!("  [{}] {}: {}", comment.id, author, comment.message);
                }
            })?;
        }
        CampaignAction::Create { fields } => {
            let mut input = CampaignInput::new("");
            fields.apply(&mut input);
            let campaign = client.campaigns().create(&input).await?;
            println!("Created campaign {} ({})", campaign.id, campaign.title);
        }
        CampaignAction::Update { id, fields } => {
            let current = client.campaigns().get(&id).await?;
            let mut input = CampaignInput::from(&current);
            fields.apply(&mut input);
            client.campaigns().update(&id, &input).await?;
            println!("Updated campaign {}", id);
        }
        CampaignAction::Delete { id } => {
            client.campaigns().delete(&id).await?;
            println!("Deleted campaign {}", id);
        }
        CampaignAction::Comment { id, message } => {
            let comment = client.campaigns().add_comment(&id, &message).await?;
            println!("Added comment {}", comment.id);
        }
        CampaignAction::Uncomment { comment_id } => {
            client.campaigns().delete_comment(&comment_id).await?;
            println!("Deleted comment {}", comment_id);
        }
    }
    Ok(())
}

async fn content(client: &ApiClient, format: Format, action: ContentAction) -> anyhow::Result<()> {
    match action {
        ContentAction::List => {
            let ads = client.content().list().await?;
            emit(format, &ads, || {
                if ads.is_empty() {
                    println!("No ad copy yet.");
                    return;
                }
                println!("{:<8} {:<10} {:<12} {}", "ID", "Campaign", "Tone", "Text");
                println!("{}", "-".repeat(76));
                for ad in &ads {
                    println!(
                        "{:<8} {:<10} {:<12} {}",
                        ad.id,
                        ad.campaign.as_ref().map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
                        ad.tone.as_deref().unwrap_or("-"),
                        truncate(&ad.text, 60)
                    );
                }
            })?;
        }
        ContentAction::Delete { id } => {
            client.content().delete(&id).await?;
            println!("Deleted ad copy {}", id);
        }
        ContentAction::Generate {
            campaign,
            prompt,
            tone,
            platform,
            variations,
        } => {
            let mut request = TextGenerationRequest::new(prompt, campaign);
            request.tone = tone;
            request.platform = platform;
            request.variations = variations;

            let result = client.content().generate_text(&request).await?;
            emit(format, &result, || {
                for (n, text) in result.texts().iter().enumerate() {
                    println!("--- Variation {} ---", n + 1);
                    println!("{}", text);
                    println!();
                }
                if !result.saved_ads.is_empty() {
                    println!("Saved {} ads to the campaign", result.saved_ads.len());
                }
            })?;
        }
    }
    Ok(())
}

async fn images(client: &ApiClient, format: Format, action: ImageAction) -> anyhow::Result<()> {
    match action {
        ImageAction::List => {
            let images = client.images().list().await?;
            emit(format, &images, || {
                if images.is_empty() {
                    println!("No images yet.");
                    return;
                }
                println!("{:<8} {:<10} {}", "ID", "Campaign", "URL");
                println!("{}", "-".repeat(76));
                for image in &images {
                    println!(
                        "{:<8} {:<10} {}",
                        image.id,
                        image.campaign.as_ref().map(|c| c.to_string()).unwrap_or_else(|| "-".into()),
                        image.image_url
                    );
                }
            })?;
        }
        ImageAction::Delete { id } => {
            client.images().delete(&id).await?;
            println!("Deleted image {}", id);
        }
        ImageAction::Edit { id, prompt } => {
            client.images().update_prompt(&id, &prompt).await?;
            println!("Updated prompt of image {}", id);
        }
        ImageAction::Generate {
            campaign,
            prompt,
            style,
            aspect_ratio,
            template,
            headline,
            tagline,
            cta,
            no_text,
            save,
        } => {
            let mut request = ImageGenerationRequest::new(prompt.clone(), campaign.clone());
            request.style = style;
            request.aspect_ratio = aspect_ratio;
            request.ad_template = template;
            request.include_text = !no_text;
            request.headline = headline.unwrap_or_default();
            request.tagline = tagline.unwrap_or_default();
            if let Some(cta) = cta {
                request.cta_text = cta;
            }

            let generated = client.images().generate(&request).await?;
            if generated.is_empty() {
                bail!("no images were generated; try a different prompt");
            }

            if save {
                for image in &generated {
                    let request = SaveImageRequest::from_generated(campaign.clone(), image, &prompt);
                    let saved = client.images().save(&request).await?;
                    println!("Saved {} image as {} ({})", image.provider, saved.id, saved.image_url);
                }
            } else {
                emit(format, &generated, || {
                    for image in &generated {
                        println!(
                            "{}: {} bytes of image data (use --save to keep it)",
                            image.provider,
                            image.image_data.len()
                        );
                    }
                })?;
            }
        }
        ImageAction::Save {
            campaign,
            file,
            provider,
            prompt,
        } => {
            let image_data = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {:?}", file))?;
            let request = SaveImageRequest {
                campaign_id: campaign,
                image_data: image_data.trim().to_string(),
                provider,
                prompt,
            };
            let saved = client.images().save(&request).await?;
            println!("Saved image {} ({})", saved.id, saved.image_url);
        }
    }
    Ok(())
}

async fn ab_tests(client: &ApiClient, format: Format, action: AbTestAction) -> anyhow::Result<()> {
    match action {
        AbTestAction::List => {
            let tests = client.ab_tests().list().await?;
            emit(format, &tests, || {
                if tests.is_empty() {
                    println!("No A/B tests yet.");
                    return;
                }
                for test in &tests {
                    println!(
                        "[{}] {} ({}, metric: {})",
                        test.id,
                        test.name,
                        test.status,
                        test.success_metric.to_uppercase()
                    );
                    for v in &test.variations {
                        let marker = if test.is_winner(v) { " <- winner" } else { "" };
                        println!(
                            "    {:<6} impressions {:>8}  clicks {:>6}  ctr {:>5.2}%  conversions {:>5}{}",
                            v.name, v.impressions, v.clicks, v.ctr, v.conversions, marker
                        );
                    }
                }
            })?;
        }
        AbTestAction::Create {
            campaign,
            name,
            description,
            metric,
            variations,
        } => {
            let mut test = NewAbTest::new(campaign, name);
            test.description = description;
            test.success_metric = metric;
            if !variations.is_empty() {
                test.variations = variations.into_iter().map(VariationInput::new).collect();
            }
            let created = client.ab_tests().create(&test).await?;
            println!("Created A/B test {}", created.id);
        }
        AbTestAction::Start { id } => {
            client.ab_tests().start(&id).await?;
            println!("Started A/B test {}", id);
        }
        AbTestAction::Analyze { id } => {
            let result = client.ab_tests().analyze(&id).await?;
            emit(format, &result, || {
                if result.is_completed() {
                    println!(
                        "Winner: Variation {}",
                        result.analysis.winner.as_deref().unwrap_or("?")
                    );
                } else {
                    println!(
                        "{}",
                        result.analysis.message.as_deref().unwrap_or("Not enough data yet")
                    );
                }
            })?;
        }
    }
    Ok(())
}

async fn api_keys(client: &ApiClient, format: Format, action: ApiKeyAction) -> anyhow::Result<()> {
    match action {
        ApiKeyAction::List => {
            let keys = client.api_keys().list().await?;
            emit(format, &keys, || {
                if keys.is_empty() {
                    println!("No API keys stored.");
                    return;
                }
                println!(
                    "{:<6} {:<16} {:<24} {:<10} {}",
                    "ID", "Platform", "Name", "Active", "Verification"
                );
                println!("{}", "-".repeat(72));
                for key in &keys {
                    println!(
                        "{:<6} {:<16} {:<24} {:<10} {}",
                        key.id,
                        key.api_type.display_name(),
                        truncate(&key.api_name, 24),
                        if key.is_active { "yes" } else { "no" },
                        key.verification_status.as_deref().unwrap_or("-")
                    );
                }
            })?;
        }
        ApiKeyAction::Add {
            platform,
            name,
            api_key,
            api_secret,
            account_id,
            developer_token,
        } => {
            let mut key = NewApiKey::new(platform, name, api_key);
            key.api_secret = api_secret.unwrap_or_default();
            key.account_id = account_id.unwrap_or_default();
            key.developer_token = developer_token.unwrap_or_default();
            client.api_keys().create(&key).await?;
            println!("Stored {} key", platform);
        }
        ApiKeyAction::Delete { id } => {
            client.api_keys().delete(&id).await?;
            println!("Deleted API key {}", id);
        }
        ApiKeyAction::Verify { id } => {
            let result = client.api_keys().verify(&id).await?;
            if result.is_verified() {
                println!("API key verified!");
            } else {
                bail!(
                    "verification failed{}",
                    result.message.map(|m| format!(": {}", m)).unwrap_or_default()
                );
            }
        }
        ApiKeyAction::Toggle { id } => {
            let result = client.api_keys().toggle(&id).await?;
            println!("{}", result.message);
        }
    }
    Ok(())
}

/// Print `value` as JSON, or run the table renderer
fn emit<T: Serialize>(format: Format, value: &T, table: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
        Format::Table => table(),
    }
    Ok(())
}

fn print_named_list(title: &str, items: &[serde_json::Value], label: &str, detail: &str) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("{}:", title);
    for item in items {
        let text = |key: &str| match &item[key] {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "-".to_string(),
            other => other.to_string(),
        };
        println!("  {:<20} {}", text(label), text(detail));
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
