use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "hostel-admin",
    version,
    about = "hostel management admin console",
    long_about = "hostel-admin drives the hostel management API from the terminal: account sign-up and OTP verification, login, password recovery, the user profile and the management screens (hostels, floors, rooms, bed allocation, bed payment).\n\nExamples:\n  hostel-admin login -u warden -p s3cret\n  hostel-admin screen hostels --filter hostel --page-size 10\n  hostel-admin screen rooms --sort roomNumber --sort roomNumber --format json -o rooms.json\n  hostel-admin screen bed-payment --interactive\n\nTip: Use --config to persist the API URL and session file location."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        global = true,
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.hostel-admin/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "api-url",
        visible_alias = "url",
        value_name = "URL",
        global = true,
        help_heading = "Connection",
        help = "Base URL of the hostel API (env: HOSTEL_ADMIN_API_URL)."
    )]
    pub api_url: Option<String>,

    #[arg(
        long = "session",
        value_name = "FILE",
        global = true,
        help_heading = "Connection",
        help = "Session file holding tokens and pending flow state."
    )]
    pub session: Option<String>,

    #[arg(
        long = "timeout",
        value_name = "SECS",
        global = true,
        help_heading = "Connection",
        help = "Request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        long = "proxy",
        value_name = "URL",
        global = true,
        help_heading = "Connection",
        help = "HTTP proxy for API requests."
    )]
    pub proxy: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Register a new account; an OTP is sent by email.
    Signup(SignupArgs),
    /// Verify the OTP of a registered account.
    VerifyOtp(VerifyOtpArgs),
    /// Send the registration OTP again.
    ResendOtp(ResendOtpArgs),
    /// Sign in and store the session tokens.
    Login(LoginArgs),
    /// Sign out and clear the stored session.
    Logout,
    /// Request a password reset OTP.
    ForgotPassword(ForgotPasswordArgs),
    /// Set a new password with the reset OTP.
    ResetPassword(ResetPasswordArgs),
    /// Change the password of the signed-in account.
    ChangePassword(ChangePasswordArgs),
    /// Show or update the signed-in profile.
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Manage the config file.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Render a management screen or open it interactively.
    Screen(ScreenArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SignupArgs {
    #[arg(short = 'u', long = "username", value_name = "NAME", help = "Display name.")]
    pub username: String,

    #[arg(short = 'e', long = "email", value_name = "EMAIL", help = "Email address.")]
    pub email: String,

    #[arg(short = 'm', long = "mobile", value_name = "DIGITS", help = "Mobile number.")]
    pub mobile: String,

    #[arg(short = 'p', long = "password", value_name = "PASSWORD", help = "Password.")]
    pub password: String,

    #[arg(
        long = "confirm-password",
        value_name = "PASSWORD",
        help = "Password confirmation (defaults to --password)."
    )]
    pub confirm_password: Option<String>,

    #[arg(
        short = 'r',
        long = "role",
        value_name = "ROLE",
        default_value = "Admin",
        help = "User role."
    )]
    pub role: String,

    #[arg(long = "agree-terms", help = "Agree to the terms of service.")]
    pub agree_terms: bool,
}

#[derive(Args, Debug, Clone)]
pub struct VerifyOtpArgs {
    #[arg(
        long = "id",
        value_name = "ID",
        help = "Account id (defaults to the last registration)."
    )]
    pub id: Option<i64>,

    #[arg(short = 'o', long = "otp", value_name = "CODE", help = "OTP from the email.")]
    pub otp: String,
}

#[derive(Args, Debug, Clone)]
pub struct ResendOtpArgs {
    #[arg(
        long = "id",
        value_name = "ID",
        help = "Account id (defaults to the last registration)."
    )]
    pub id: Option<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(short = 'u', long = "username", value_name = "NAME", help = "Username.")]
    pub username: String,

    #[arg(short = 'p', long = "password", value_name = "PASSWORD", help = "Password.")]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct ForgotPasswordArgs {
    #[arg(
        short = 'i',
        long = "identifier",
        value_name = "EMAIL|MOBILE",
        help = "Registered email or 10-digit mobile number."
    )]
    pub identifier: String,
}

#[derive(Args, Debug, Clone)]
pub struct ResetPasswordArgs {
    #[arg(
        short = 'i',
        long = "identifier",
        value_name = "EMAIL|MOBILE",
        help = "Account to reset (defaults to the pending reset)."
    )]
    pub identifier: Option<String>,

    #[arg(
        short = 'o',
        long = "otp",
        value_name = "CODE",
        default_value = "",
        help = "6-digit OTP."
    )]
    pub otp: String,

    #[arg(
        long = "new-password",
        value_name = "PASSWORD",
        default_value = "",
        help = "New password."
    )]
    pub new_password: String,

    #[arg(
        long = "confirm-password",
        value_name = "PASSWORD",
        default_value = "",
        help = "New password again."
    )]
    pub confirm_password: String,
}

#[derive(Args, Debug, Clone)]
pub struct ChangePasswordArgs {
    #[arg(
        long = "old-password",
        value_name = "PASSWORD",
        default_value = "",
        help = "Current password."
    )]
    pub old_password: String,

    #[arg(
        long = "new-password",
        value_name = "PASSWORD",
        default_value = "",
        help = "New password."
    )]
    pub new_password: String,

    #[arg(
        long = "confirm-password",
        value_name = "PASSWORD",
        default_value = "",
        help = "New password again."
    )]
    pub confirm_password: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// Fetch the signed-in user.
    Show,
    /// Update the signed-in user; unset fields keep their cached values.
    Update(ProfileUpdateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProfileUpdateArgs {
    #[arg(long = "name", value_name = "NAME", help = "Display name.")]
    pub name: Option<String>,

    #[arg(long = "bio", value_name = "TEXT", help = "Short biography.")]
    pub bio: Option<String>,

    #[arg(long = "email", value_name = "EMAIL", help = "Email address.")]
    pub email: Option<String>,

    #[arg(long = "mobile", value_name = "DIGITS", help = "Mobile number.")]
    pub mobile: Option<String>,

    #[arg(
        long = "active",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL",
        help = "Account active flag."
    )]
    pub active: Option<bool>,

    #[arg(long = "image", value_name = "FILE", help = "Profile image to upload (required).")]
    pub image: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Write a default config file if none exists.
    Init,
    /// Print the effective settings.
    Show,
}

#[derive(Args, Debug, Clone)]
pub struct ScreenArgs {
    #[arg(
        value_name = "SCREEN",
        help = "hostels, floors, rooms, bed-allocation or bed-payment."
    )]
    pub screen: String,

    #[arg(
        short = 'f',
        long = "filter",
        value_name = "TEXT",
        help_heading = "Table",
        help = "Case-insensitive filter on the screen's filter field."
    )]
    pub filter: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Table",
        help = "Page to show (1-based)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 's',
        long = "page-size",
        value_name = "N",
        help_heading = "Table",
        help = "Rows per page: 5, 10, 20, 50, 100, 150 or 200."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "sort",
        value_name = "COLUMN",
        action = ArgAction::Append,
        help_heading = "Table",
        help = "Sort by column (repeatable; repeating a column reverses it)."
    )]
    pub sort: Vec<String>,

    #[arg(
        short = 'F',
        long = "format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or xml."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the page to a file (format inferred from extension)."
    )]
    pub output: Option<String>,

    #[arg(
        long = "remote",
        help_heading = "Input",
        help = "Seed the hostel list from the API instead of the built-in fixture."
    )]
    pub remote: bool,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Input",
        help = "Open an interactive console on the screen."
    )]
    pub interactive: bool,
}
