use account_portal::config::load_portal_config;
use account_portal::controllers::{
    ChangeEmailForm, ChangeEmailRecoveryForm, ChangePasswordForm, FlowError, ForgotPasswordForm,
    LoginForm, NewPasswordForm, RegisterForm,
};
use account_portal::portal::Portal;
use account_portal::ui::Route;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Session file used when neither the flag nor the configuration names one
const DEFAULT_SESSION_FILE: &str = ".account-portal-session";

#[derive(Parser)]
#[command(name = "account_portal", version, about = "Account portal command line front-end")]
#[command(propagate_version = true)]
struct Cli {
    /// Account API base URL, overrides PORTAL_API_BASE_URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// File holding the session token between runs
    #[arg(long, global = true)]
    session_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        /// CPF or CNPJ, masked or digits only
        #[arg(long)]
        cpf_cnpj: String,
        #[arg(long)]
        phone_number: String,
    },
    /// Log in and keep the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Ask for a password recovery code
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with a recovery code
    NewPassword {
        #[arg(long)]
        code: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Show the profile of the logged-in account
    Profile,
    ChangeEmail {
        #[arg(long)]
        email: String,
        /// Current password
        #[arg(long)]
        password: String,
    },
    ChangeEmailRecovery {
        #[arg(long)]
        email_recovery: String,
        /// Current password
        #[arg(long)]
        password: String,
    },
    ChangePassword {
        #[arg(long)]
        current_password: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Flip the remember-password-change preference
    ToggleRememberPasswordChange,
    /// Resolve a route through the session guard
    Navigate { path: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match load_portal_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        },
    };
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    config.session_file = cli
        .session_file
        .or(config.session_file)
        .or_else(|| Some(DEFAULT_SESSION_FILE.to_string()));

    let portal = Portal::from_config(&config);
    match run(&portal, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("Command failed: {}", e);
            ExitCode::FAILURE
        },
    }
}

async fn run(portal: &Portal, command: Commands) -> Result<(), FlowError> {
    match command {
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
            cpf_cnpj,
            phone_number,
        } => {
            let form = RegisterForm {
                name,
                email,
                password,
                confirm_password,
                cpf_cnpj,
                phone_number,
            };
            portal.register().submit(&form).await
        },
        Commands::Login {
            email,
            password,
        } => {
            portal
                .login()
                .submit(&LoginForm {
                    email,
                    password,
                })
                .await
        },
        Commands::Logout => portal.login().logout(),
        Commands::ForgotPassword {
            email,
        } => {
            portal
                .forgot_password()
                .submit(&ForgotPasswordForm {
                    email,
                })
                .await
        },
        Commands::NewPassword {
            code,
            password,
            confirm_password,
        } => {
            let form = NewPasswordForm {
                code,
                password,
                confirm_password,
            };
            portal.new_password().submit(&form).await
        },
        Commands::Profile => show_profile(portal).await,
        Commands::ChangeEmail {
            email,
            password,
        } => {
            portal.profile().open_change_email();
            portal
                .change_email()
                .submit(&ChangeEmailForm {
                    email,
                    password,
                })
                .await
        },
        Commands::ChangeEmailRecovery {
            email_recovery,
            password,
        } => {
            portal.profile().open_change_email_recovery();
            portal
                .change_email_recovery()
                .submit(&ChangeEmailRecoveryForm {
                    email_recovery,
                    password,
                })
                .await
        },
        Commands::ChangePassword {
            current_password,
            new_password,
            confirm_password,
        } => {
            portal.profile().open_change_password();
            let form = ChangePasswordForm {
                current_password,
                new_password,
                confirm_password,
            };
            portal.change_password().submit(&form).await
        },
        Commands::ToggleRememberPasswordChange => {
            let enabled = portal.profile().toggle_remember_password_change().await?;
            println!("Remember password change: {}", if enabled { "on" } else { "off" });
            Ok(())
        },
        Commands::Navigate {
            path,
        } => {
            let Some(route) = Route::from_path(&path) else {
                eprintln!("Unknown route {}", path);
                return Err(FlowError::Validation(format!("Unknown route {}", path)));
            };
            let shown = portal.navigate(route);
            println!("{}", shown);
            if shown == route {
                Ok(())
            } else {
                Err(FlowError::MissingSession)
            }
        },
    }
}

async fn show_profile(portal: &Portal) -> Result<(), FlowError> {
    if portal.navigate(Route::Profile) != Route::Profile {
        eprintln!("Not logged in");
        return Err(FlowError::MissingSession);
    }

    let profile = portal.profile();
    let result = profile.load().await;
    let data = profile.profile();
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    println!("Name:            {}", field(&data.name));
    println!("Email:           {}", field(&data.email));
    println!("Recovery email:  {}", field(&data.email_recovery));
    println!("CPF/CNPJ:        {}", field(&data.cpf_cnpj));
    println!("Phone:           {}", field(&data.phone_number));
    println!("Photo:           {}", field(&data.profile_photo));
    println!(
        "Remember password change: {}",
        if profile.remember_password_change() { "on" } else { "off" }
    );
    result
}
