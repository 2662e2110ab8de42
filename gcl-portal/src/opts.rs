use clap::{Args, Parser, ValueHint};

/// Grid portal gating views on a fresh X.509 certificate and Grid proxy.
#[derive(Parser, Debug)]
#[clap(
    name = "gcl-portal",
    version = "0.1",
    author = "Wouter Geraedts <w.geraedts@sarif.nl>, Leon Botros <l.botros@cs.ru.nl>"
)]
pub struct Opts {
    #[clap(subcommand)]
    pub subcmd: Subcommand,
}

#[derive(Parser, Debug)]
pub enum Subcommand {
    Server(ServerOpts),
    Check(CheckOpts),
}

/// Gate settings shared by the server and the check command.
#[derive(Args, Debug, Clone)]
pub struct GateOpts {
    /// Directory holding one credential directory per user.
    #[clap(long, env = "GRIDCERTLIB_ROOT", value_hint = ValueHint::DirPath)]
    pub credential_root: Option<String>,

    /// Maximum age (in seconds) of a user certificate (10 days).
    #[clap(long, env = "GRIDCERTLIB_CERTIFICATE_MAX_AGE", default_value = "864000")]
    pub certificate_max_age: u64,

    /// Maximum age (in seconds) of a Grid proxy (11 hours).
    #[clap(long, env = "GRIDCERTLIB_PROXY_MAX_AGE", default_value = "39600")]
    pub proxy_max_age: u64,
}

/// Run the portal HTTP service.
#[derive(Parser, Debug, Clone)]
#[clap(name = "Server")]
pub struct ServerOpts {
    /// Host to bind this service to.
    #[clap(short = 'H', long, default_value = "0.0.0.0", value_hint = ValueHint::Hostname)]
    pub host: String,

    /// Port to bind this service to.
    #[clap(short, long, default_value = "8000")]
    pub port: String,

    #[clap(flatten)]
    pub gate: GateOpts,

    /// URL of the GridCertLib `SlcsInit` servlet issuing certificates.
    #[clap(long, env = "GRIDCERTLIB_SLCSINIT_URL", value_hint = ValueHint::Url)]
    pub slcs_init_url: Option<String>,

    /// URL of the GridCertLib `VomsProxyInit` servlet issuing proxies.
    #[clap(long, env = "GRIDCERTLIB_PROXYINIT_URL", value_hint = ValueHint::Url)]
    pub proxy_init_url: Option<String>,

    /// Virtual organization to request a proxy for (repeatable).
    #[clap(long = "vo", default_value = "smscg")]
    pub vo: Vec<String>,

    /// Login page unauthenticated users are sent to.
    #[clap(long, default_value = "/login/")]
    pub login_url: String,

    /// Query parameter carrying the return URL to the login page.
    #[clap(long, default_value = "next")]
    pub redirect_field_name: String,

    /// Header set by the authenticating front end (e.g. Shibboleth) to the username.
    #[clap(long, default_value = "X-Remote-User")]
    pub user_header: String,

    /// Base64-encoded key (at least 64 bytes) signing the session cookie.
    #[clap(long, env = "GRIDCERTLIB_SESSION_KEY")]
    pub session_key: Option<String>,

    /// Send the session cookie over plain HTTP as well.
    #[clap(long)]
    pub insecure_session_cookie: bool,

    /// Use this private key passphrase for every session instead of a random one.
    #[clap(long, env = "GRIDCERTLIB_FIXED_PASSPHRASE")]
    pub fixed_passphrase: Option<String>,

    /// Program used to print certificate details.
    #[clap(long, default_value = "openssl", value_hint = ValueHint::CommandName)]
    pub x509_tool: String,
}

/// Report on the credentials of a user.
#[derive(Parser, Debug)]
#[clap(name = "Check")]
pub struct CheckOpts {
    /// The user whose credential directory to inspect.
    #[clap(short, long)]
    pub user: String,

    #[clap(flatten)]
    pub gate: GateOpts,
}
