//! Typed values for the composite configuration grammars.
//!
//! Each type is a pure value transformer: `from_tokens` consumes the
//! directive's argument tokens (arity already checked by the registry),
//! validates them, and produces an immutable value. No I/O, no global
//! state. ACL-bearing types join their trailing tokens with a single
//! space and delegate to [`Acl::from_string`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use acl::Acl;
use regex::Regex;

use crate::error::ConfigError;
use crate::util;

fn acl_tail(toks: &[String]) -> Result<Acl, ConfigError> {
    Ok(Acl::from_string(&toks.join(" "))?)
}

/// `ascii_downloads <size|*> [masks...]` — size cap (KB, `-1` unlimited)
/// and filename masks for ASCII-mode downloads.
#[derive(Clone, Debug)]
pub struct AsciiDownloads {
    size: i64,
    masks: Vec<String>,
}

impl Default for AsciiDownloads {
    fn default() -> Self {
        Self {
            size: -1,
            masks: Vec::new(),
        }
    }
}

impl AsciiDownloads {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let mut size = util::parse_size(&toks[0])?;
        if size == 0 {
            size = -1;
        }
        Ok(Self {
            size,
            masks: toks[1..].to_vec(),
        })
    }

    /// Whether a file of `size` KB at `path` may be downloaded in ASCII mode.
    #[must_use]
    pub fn allowed(&self, size: i64, path: &str) -> bool {
        if self.size != -1 && size > self.size {
            return false;
        }
        self.masks.is_empty() || util::wildcard_match_any(&self.masks, path)
    }
}

/// `ascii_uploads [masks...]` — filename masks permitted for ASCII uploads.
#[derive(Clone, Debug, Default)]
pub struct AsciiUploads {
    masks: Vec<String>,
}

impl AsciiUploads {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            masks: toks.to_vec(),
        })
    }

    /// Whether `path` may be uploaded in ASCII mode.
    #[must_use]
    pub fn allowed(&self, path: &str) -> bool {
        self.masks.is_empty() || util::wildcard_match_any(&self.masks, path)
    }
}

/// `secure_ip <min fields> <allow hostname> <need ident> <acl...>`
#[derive(Clone, Debug)]
pub struct SecureIp {
    min_fields: u32,
    allow_hostname: bool,
    need_ident: bool,
    acl: Acl,
}

impl SecureIp {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let min_fields = util::parse_nonneg(&toks[0])? as u32;
        Ok(Self {
            min_fields,
            allow_hostname: util::parse_bool(&toks[1])?,
            need_ident: util::parse_bool(&toks[2])?,
            acl: acl_tail(&toks[3..])?,
        })
    }

    /// Minimum number of significant fields an IP mask must carry.
    #[must_use]
    pub fn min_fields(&self) -> u32 {
        self.min_fields
    }

    /// Whether hostname masks are acceptable.
    #[must_use]
    pub fn allow_hostname(&self) -> bool {
        self.allow_hostname
    }

    /// Whether an ident prefix is required.
    #[must_use]
    pub fn need_ident(&self) -> bool {
        self.need_ident
    }

    /// Users this strength requirement applies to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// `secure_pass <mask> <acl...>` — password strength mask per ACL.
#[derive(Clone, Debug)]
pub struct SecurePass {
    mask: String,
    acl: Acl,
}

impl SecurePass {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            mask: toks[0].clone(),
            acl: acl_tail(&toks[1..])?,
        })
    }

    /// The strength mask, e.g. `8ULN`.
    #[must_use]
    pub fn mask(&self) -> &str {
        &self.mask
    }

    /// Users the mask applies to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// `speed_limit <path> <dl KB/s> <ul KB/s> <acl...>` — a per-path
/// cumulative transfer-rate ceiling restricted to matching users.
#[derive(Clone, Debug)]
pub struct SpeedLimit {
    path: String,
    dl_limit: i64,
    ul_limit: i64,
    acl: Acl,
}

impl SpeedLimit {
    /// Builds a limit directly; config files go through the loader.
    #[must_use]
    pub fn new(path: impl Into<String>, dl_limit: i64, ul_limit: i64, acl: Acl) -> Self {
        Self {
            path: path.into(),
            dl_limit,
            ul_limit,
            acl,
        }
    }

    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: toks[0].clone(),
            dl_limit: util::parse_nonneg(&toks[1])?,
            ul_limit: util::parse_nonneg(&toks[2])?,
            acl: acl_tail(&toks[3..])?,
        })
    }

    /// The path pattern the limit aggregates over.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Download ceiling in KB/s; `0` means unlimited.
    #[must_use]
    pub fn dl_limit(&self) -> i64 {
        self.dl_limit
    }

    /// Upload ceiling in KB/s; `0` means unlimited.
    #[must_use]
    pub fn ul_limit(&self) -> i64 {
        self.ul_limit
    }

    /// Users the limit applies to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }

    /// Whether the limit governs transfers under `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        util::wildcard_match(&self.path, path, false)
    }
}

/// `sim_xfers <max downloads> <max uploads>` — simultaneous transfer
/// slots; `-1` means unlimited.
#[derive(Clone, Debug)]
pub struct SimXfers {
    max_downloads: i32,
    max_uploads: i32,
}

impl Default for SimXfers {
    fn default() -> Self {
        Self {
            max_downloads: -1,
            max_uploads: -1,
        }
    }
}

impl SimXfers {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            max_downloads: util::parse_int(&toks[0])? as i32,
            max_uploads: util::parse_int(&toks[1])? as i32,
        })
    }

    /// Maximum simultaneous downloads.
    #[must_use]
    pub fn max_downloads(&self) -> i32 {
        self.max_downloads
    }

    /// Maximum simultaneous uploads.
    #[must_use]
    pub fn max_uploads(&self) -> i32 {
        self.max_uploads
    }
}

/// `pasv_addr <addr> [nat]` — advertised passive address.
#[derive(Clone, Debug)]
pub struct PasvAddr {
    addr: String,
    nat: bool,
}

impl PasvAddr {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let nat = match toks.get(1) {
            Some(token) => util::parse_bool(token)?,
            None => false,
        };
        Ok(Self {
            addr: toks[0].clone(),
            nat,
        })
    }

    /// The advertised address.
    #[must_use]
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Whether the address sits behind NAT.
    #[must_use]
    pub fn nat(&self) -> bool {
        self.nat
    }
}

/// An inclusive data-port range, both bounds within 1024–65535.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PortRange {
    from: u16,
    to: u16,
}

impl PortRange {
    /// Lower bound.
    #[must_use]
    pub fn from(&self) -> u16 {
        self.from
    }

    /// Upper bound.
    #[must_use]
    pub fn to(&self) -> u16 {
        self.to
    }
}

/// `active_ports` / `pasv_ports <from[-to]>...` — data port ranges.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ports {
    ranges: Vec<PortRange>,
}

impl Ports {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let mut ranges = Vec::with_capacity(toks.len());
        for token in toks {
            let mut parts = token.splitn(2, '-');
            let from = util::parse_int(parts.next().unwrap_or_default())?;
            let to = match parts.next() {
                Some(part) => util::parse_int(part)?,
                None => from,
            };
            if to < from {
                return Err(ConfigError::value(format!(
                    "to port lower than from port in port range '{token}'"
                )));
            }
            if !(1024..=65535).contains(&from) || !(1024..=65535).contains(&to) {
                return Err(ConfigError::value(format!(
                    "port out of range 1024-65535 in '{token}'"
                )));
            }
            ranges.push(PortRange {
                from: from as u16,
                to: to as u16,
            });
        }
        Ok(Self { ranges })
    }

    /// The configured ranges, in file order.
    #[must_use]
    pub fn ranges(&self) -> &[PortRange] {
        &self.ranges
    }
}

/// `allow_fxp <downloads> <uploads> <logging> <acl...>`
#[derive(Clone, Debug)]
pub struct AllowFxp {
    downloads: bool,
    uploads: bool,
    logging: bool,
    acl: Acl,
}

impl Default for AllowFxp {
    fn default() -> Self {
        Self {
            downloads: true,
            uploads: true,
            logging: false,
            acl: Acl::permit_all(),
        }
    }
}

impl AllowFxp {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            downloads: util::parse_bool(&toks[0])?,
            uploads: util::parse_bool(&toks[1])?,
            logging: util::parse_bool(&toks[2])?,
            acl: acl_tail(&toks[3..])?,
        })
    }

    /// Whether FXP downloads are permitted.
    #[must_use]
    pub fn downloads(&self) -> bool {
        self.downloads
    }

    /// Whether FXP uploads are permitted.
    #[must_use]
    pub fn uploads(&self) -> bool {
        self.uploads
    }

    /// Whether FXP transfers are logged.
    #[must_use]
    pub fn logging(&self) -> bool {
        self.logging
    }

    /// Users the rule applies to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// A path with a trailing ACL clause (`welcome_msg`, `goodbye_msg`,
/// `newsfile`).
#[derive(Clone, Debug)]
pub struct AclWithPath {
    path: PathBuf,
    acl: Acl,
}

impl AclWithPath {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: PathBuf::from(&toks[0]),
            acl: acl_tail(&toks[1..])?,
        })
    }

    /// The file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Users the file is shown to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// `alias <name> <path>` — a directory alias for CWD.
#[derive(Clone, Debug)]
pub struct Alias {
    name: String,
    path: String,
}

impl Alias {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            name: toks[0].to_ascii_lowercase(),
            path: toks[1].clone(),
        })
    }

    /// Alias name, lower-cased for case-insensitive lookup.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A filesystem right: `<keyword> <path mask> <acl...>` — the rights
/// keywords (`upload`, `delete`, `makedir`, ...) each accumulate an
/// ordered list of these; the first entry whose mask matches decides.
#[derive(Clone, Debug)]
pub struct Right {
    path: String,
    acl: Acl,
}

impl Right {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: toks[0].clone(),
            acl: acl_tail(&toks[1..])?,
        })
    }

    /// The path mask the right governs.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Users granted (or denied) the right.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }

    /// Whether the mask matches the given virtual path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        util::wildcard_match(&self.path, path, false)
    }
}

/// `stat_section <keyword> <path> <separate credits>`
#[derive(Clone, Debug)]
pub struct StatSection {
    keyword: String,
    path: String,
    separate_credits: bool,
}

impl StatSection {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            keyword: toks[0].clone(),
            path: toks[1].clone(),
            separate_credits: util::parse_bool(&toks[2])?,
        })
    }

    /// Section keyword shown in stats output.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Path mask the section covers.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the section keeps its own credit pool.
    #[must_use]
    pub fn separate_credits(&self) -> bool {
        self.separate_credits
    }
}

/// `path-filter <message path> <regex> <acl...>` — filename validation
/// for uploads.
#[derive(Clone, Debug)]
pub struct PathFilter {
    message_path: String,
    regex: Regex,
    acl: Acl,
}

impl PathFilter {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let regex = Regex::new(&toks[1]).map_err(|err| {
            ConfigError::value(format!("invalid path-filter expression: {err}"))
        })?;
        Ok(Self {
            message_path: toks[0].clone(),
            regex,
            acl: acl_tail(&toks[2..])?,
        })
    }

    /// Message file displayed on rejection.
    #[must_use]
    pub fn message_path(&self) -> &str {
        &self.message_path
    }

    /// The filename validation expression.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Users the filter applies to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// `max_users <users> <exempt users>`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MaxUsers {
    users: i32,
    exempt: i32,
}

impl Default for MaxUsers {
    fn default() -> Self {
        Self {
            users: 50,
            exempt: 5,
        }
    }
}

impl MaxUsers {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            users: util::parse_nonneg(&toks[0])? as i32,
            exempt: util::parse_nonneg(&toks[1])? as i32,
        })
    }

    /// Regular login slots.
    #[must_use]
    pub fn users(&self) -> i32 {
        self.users
    }

    /// Extra slots for exempt users.
    #[must_use]
    pub fn exempt(&self) -> i32 {
        self.exempt
    }
}

/// An integer argument with a trailing ACL (`max_ustats`, `max_gstats`).
#[derive(Clone, Debug)]
pub struct AclInt {
    arg: i32,
    acl: Acl,
}

impl AclInt {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            arg: util::parse_int(&toks[0])? as i32,
            acl: acl_tail(&toks[1..])?,
        })
    }

    /// The integer argument.
    #[must_use]
    pub fn arg(&self) -> i32 {
        self.arg
    }

    /// Users the value applies to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// `show_totals <max lines|*> [paths...]`
#[derive(Clone, Debug)]
pub struct ShowTotals {
    max_lines: i32,
    paths: Vec<String>,
}

impl ShowTotals {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let max_lines = if toks[0] == "*" {
            -1
        } else {
            util::parse_nonneg(&toks[0])? as i32
        };
        Ok(Self {
            max_lines,
            paths: toks[1..].to_vec(),
        })
    }

    /// Maximum lines shown; `-1` for no limit.
    #[must_use]
    pub fn max_lines(&self) -> i32 {
        self.max_lines
    }

    /// Path masks the totals are shown in.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

/// `dupe_check <days> <ignore case>`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DupeCheck {
    days: i32,
    ignore_case: bool,
}

impl DupeCheck {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            days: util::parse_nonneg(&toks[0])? as i32,
            ignore_case: util::parse_bool(&toks[1])?,
        })
    }

    /// Days a release stays in the dupe database.
    #[must_use]
    pub fn days(&self) -> i32 {
        self.days
    }

    /// Whether comparisons ignore case.
    #[must_use]
    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }
}

/// `script <path> <masks...>` — an external script triggered on matching
/// paths.
#[derive(Clone, Debug)]
pub struct Script {
    path: PathBuf,
    masks: Vec<String>,
}

impl Script {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: PathBuf::from(&toks[0]),
            masks: toks[1..].to_vec(),
        })
    }

    /// Script location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path masks that trigger the script.
    #[must_use]
    pub fn masks(&self) -> &[String] {
        &self.masks
    }
}

/// `lslong <options> [max recursion]` — listing options.
#[derive(Clone, Debug)]
pub struct Lslong {
    options: String,
    max_recursion: i32,
}

impl Default for Lslong {
    fn default() -> Self {
        Self {
            options: "l".to_owned(),
            max_recursion: 0,
        }
    }
}

impl Lslong {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let options = toks[0].strip_prefix('-').unwrap_or(&toks[0]).to_owned();
        let max_recursion = match toks.get(1) {
            Some(token) => util::parse_nonneg(token)? as i32,
            None => 0,
        };
        Ok(Self {
            options,
            max_recursion,
        })
    }

    /// Listing option letters, without a leading dash.
    #[must_use]
    pub fn options(&self) -> &str {
        &self.options
    }

    /// Maximum recursion depth for recursive listings.
    #[must_use]
    pub fn max_recursion(&self) -> i32 {
        self.max_recursion
    }
}

/// `hidden_files <path> <masks...>` — masks hidden from listings.
#[derive(Clone, Debug)]
pub struct HiddenFiles {
    path: String,
    masks: Vec<String>,
}

impl HiddenFiles {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: toks[0].clone(),
            masks: toks[1..].to_vec(),
        })
    }

    /// Path mask the rule applies under.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Filename masks to hide.
    #[must_use]
    pub fn masks(&self) -> &[String] {
        &self.masks
    }
}

/// `requests <path> <max>`
#[derive(Clone, Debug)]
pub struct Requests {
    path: PathBuf,
    max: i32,
}

impl Default for Requests {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            max: 10,
        }
    }
}

impl Requests {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: PathBuf::from(&toks[0]),
            max: util::parse_nonneg(&toks[1])? as i32,
        })
    }

    /// Request file location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Maximum number of open requests.
    #[must_use]
    pub fn max(&self) -> i32 {
        self.max
    }
}

/// Which sessions `lastonline` records.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LastonlineKind {
    /// Every session.
    All,
    /// Only sessions ended by timeout.
    Timeout,
    /// Every session that transferred data.
    AllWithActivity,
}

/// `lastonline <all|timeout|all_with_activity> [max]`
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Lastonline {
    kind: LastonlineKind,
    max: i32,
}

impl Default for Lastonline {
    fn default() -> Self {
        Self {
            kind: LastonlineKind::All,
            max: 10,
        }
    }
}

impl Lastonline {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let kind = match toks[0].to_ascii_lowercase().as_str() {
            "all" => LastonlineKind::All,
            "timeout" => LastonlineKind::Timeout,
            "all_with_activity" => LastonlineKind::AllWithActivity,
            other => {
                return Err(ConfigError::value(format!(
                    "invalid lastonline kind '{other}'"
                )));
            }
        };
        let max = match toks.get(1) {
            Some(token) => util::parse_nonneg(token)? as i32,
            None => 10,
        };
        Ok(Self { kind, max })
    }

    /// Which sessions are recorded.
    #[must_use]
    pub fn kind(&self) -> LastonlineKind {
        self.kind
    }

    /// Entries kept.
    #[must_use]
    pub fn max(&self) -> i32 {
        self.max
    }
}

/// `creditcheck <path> <ratio> <acl...>`
#[derive(Clone, Debug)]
pub struct Creditcheck {
    path: String,
    ratio: i32,
    acl: Acl,
}

impl Creditcheck {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: toks[0].clone(),
            ratio: util::parse_nonneg(&toks[1])? as i32,
            acl: acl_tail(&toks[2..])?,
        })
    }

    /// Path mask the ratio applies under.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Credit ratio; `0` for free download.
    #[must_use]
    pub fn ratio(&self) -> i32 {
        self.ratio
    }

    /// Users the ratio applies to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// `creditloss <multiplier> <allow leechers> <path> <acl...>`
#[derive(Clone, Debug)]
pub struct Creditloss {
    multiplier: i32,
    allow_leechers: bool,
    path: String,
    acl: Acl,
}

impl Creditloss {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            multiplier: util::parse_nonneg(&toks[0])? as i32,
            allow_leechers: util::parse_bool(&toks[1])?,
            path: toks[2].clone(),
            acl: acl_tail(&toks[3..])?,
        })
    }

    /// Upload credit multiplier.
    #[must_use]
    pub fn multiplier(&self) -> i32 {
        self.multiplier
    }

    /// Whether leech accounts lose credits too.
    #[must_use]
    pub fn allow_leechers(&self) -> bool {
        self.allow_leechers
    }

    /// Path mask the rule applies under.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Users the rule applies to.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// What happens to a nuked directory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NukedirAction {
    /// Remove the directory and its contents.
    DeleteAll,
    /// Remove the files but keep the directory.
    DeleteFiles,
    /// Keep everything, renamed by the format string.
    Keep,
}

/// `nukedir_style <format> <deleteall|deletefiles|keep> <min bytes>`
#[derive(Clone, Debug)]
pub struct NukedirStyle {
    format: String,
    action: NukedirAction,
    min_size: i64,
}

impl Default for NukedirStyle {
    fn default() -> Self {
        Self {
            format: "NUKED-%N".to_owned(),
            action: NukedirAction::Keep,
            min_size: 1024,
        }
    }
}

impl NukedirStyle {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let action = match toks[1].to_ascii_lowercase().as_str() {
            "deleteall" => NukedirAction::DeleteAll,
            "deletefiles" => NukedirAction::DeleteFiles,
            "keep" => NukedirAction::Keep,
            other => {
                return Err(ConfigError::value(format!(
                    "invalid nukedir_style action '{other}'"
                )));
            }
        };
        Ok(Self {
            format: toks[0].clone(),
            action,
            min_size: util::parse_size(&toks[2])?,
        })
    }

    /// Rename format for nuked directories.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The configured action.
    #[must_use]
    pub fn action(&self) -> NukedirAction {
        self.action
    }

    /// Minimum size (KB) for the empty-nuke penalty to apply.
    #[must_use]
    pub fn min_size(&self) -> i64 {
        self.min_size
    }
}

/// `privgroup <group> <description>`
#[derive(Clone, Debug)]
pub struct Privgroup {
    group: String,
    description: String,
}

impl Privgroup {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            group: toks[0].clone(),
            description: toks[1].clone(),
        })
    }

    /// The privileged group name.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// `msg_path <path> <file> <acl...>` — directory message file.
#[derive(Clone, Debug)]
pub struct Msgpath {
    path: String,
    file: PathBuf,
    acl: Acl,
}

impl Msgpath {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: toks[0].clone(),
            file: PathBuf::from(&toks[1]),
            acl: acl_tail(&toks[2..])?,
        })
    }

    /// Directory mask the message applies to.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The message file.
    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Users shown the message.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// `privpath <path> <acl...>` — a path hidden from non-matching users.
#[derive(Clone, Debug)]
pub struct Privpath {
    path: String,
    acl: Acl,
}

impl Privpath {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            path: toks[0].clone(),
            acl: acl_tail(&toks[1..])?,
        })
    }

    /// The protected path prefix (no wildcards, to keep listing cheap).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Users allowed to see the path.
    #[must_use]
    pub fn acl(&self) -> &Acl {
        &self.acl
    }
}

/// How a SITE command is implemented.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SiteCmdKind {
    /// Run an external program.
    Exec,
    /// Display a text file.
    Text,
    /// Alias for another command line.
    Alias,
}

/// `site_cmd <command> <EXEC|TEXT|ALIAS> <target> [description]`
#[derive(Clone, Debug)]
pub struct SiteCmd {
    command: String,
    kind: SiteCmdKind,
    target: String,
    description: Option<String>,
}

impl SiteCmd {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let kind = match toks[1].to_ascii_lowercase().as_str() {
            "exec" => SiteCmdKind::Exec,
            "text" => SiteCmdKind::Text,
            "alias" => SiteCmdKind::Alias,
            other => {
                return Err(ConfigError::value(format!(
                    "invalid site_cmd kind '{other}'"
                )));
            }
        };
        Ok(Self {
            command: toks[0].to_ascii_uppercase(),
            kind,
            target: toks[2].clone(),
            description: toks.get(3).cloned(),
        })
    }

    /// Command name, upper-cased (`custom-<command>` ACL lines match it).
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// How the command is implemented.
    #[must_use]
    pub fn kind(&self) -> SiteCmdKind {
        self.kind
    }

    /// Script path, text file, or aliased command line.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Help text, if configured.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Whether a check script runs before or after its command.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CscriptWhen {
    /// Before the command executes.
    Pre,
    /// After the command completed.
    Post,
}

/// `cscript <command> <pre|post> <script path>`
#[derive(Clone, Debug)]
pub struct Cscript {
    command: String,
    when: CscriptWhen,
    path: PathBuf,
}

impl Cscript {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let when = match toks[1].to_ascii_lowercase().as_str() {
            "pre" => CscriptWhen::Pre,
            "post" => CscriptWhen::Post,
            other => {
                return Err(ConfigError::value(format!(
                    "invalid cscript position '{other}'"
                )));
            }
        };
        Ok(Self {
            command: toks[0].to_ascii_uppercase(),
            when,
            path: PathBuf::from(&toks[2]),
        })
    }

    /// The command the script hooks, upper-cased.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Pre or post execution.
    #[must_use]
    pub fn when(&self) -> CscriptWhen {
        self.when
    }

    /// Script location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `idle_timeout <timeout> <minimum> <maximum>` (seconds).
///
/// Invariants enforced at construction: all values at least one second,
/// `minimum < maximum`, and `minimum <= timeout <= maximum`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IdleTimeout {
    maximum: Duration,
    minimum: Duration,
    timeout: Duration,
}

impl Default for IdleTimeout {
    fn default() -> Self {
        Self {
            maximum: Duration::from_secs(7200),
            minimum: Duration::from_secs(1),
            timeout: Duration::from_secs(900),
        }
    }
}

impl IdleTimeout {
    /// Builds an idle timeout from maximum, minimum, and default seconds,
    /// validating the ordering invariants.
    pub fn new(maximum: i64, minimum: i64, timeout: i64) -> Result<Self, ConfigError> {
        if timeout < 1 || minimum < 1 || maximum < 1 {
            return Err(ConfigError::value(
                "times in idle_timeout must be larger than zero",
            ));
        }
        if minimum >= maximum {
            return Err(ConfigError::value(
                "minimum must be smaller than maximum in idle_timeout",
            ));
        }
        if timeout < minimum || timeout > maximum {
            return Err(ConfigError::value(
                "default timeout must lie between minimum and maximum in idle_timeout",
            ));
        }
        Ok(Self {
            maximum: Duration::from_secs(maximum as u64),
            minimum: Duration::from_secs(minimum as u64),
            timeout: Duration::from_secs(timeout as u64),
        })
    }

    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let timeout = util::parse_int(&toks[0])?;
        let minimum = util::parse_int(&toks[1])?;
        let maximum = util::parse_int(&toks[2])?;
        Self::new(maximum, minimum, timeout)
    }

    /// Largest timeout a client may request.
    #[must_use]
    pub fn maximum(&self) -> Duration {
        self.maximum
    }

    /// Smallest timeout a client may request.
    #[must_use]
    pub fn minimum(&self) -> Duration {
        self.minimum
    }

    /// The default timeout applied to new sessions.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// `use_dir_size <unit> <paths...>` — directories listed with their
/// computed size in the given unit.
#[derive(Clone, Debug)]
pub struct UseDirSize {
    unit: char,
    paths: Vec<String>,
}

impl UseDirSize {
    pub(crate) fn from_tokens(toks: &[String]) -> Result<Self, ConfigError> {
        let unit = toks[0].to_ascii_lowercase();
        let unit = match unit.as_str() {
            "k" | "m" | "g" => unit.chars().next().unwrap_or('k'),
            other => {
                return Err(ConfigError::value(format!(
                    "invalid use_dir_size unit '{other}'"
                )));
            }
        };
        Ok(Self {
            unit,
            paths: toks[1..].to_vec(),
        })
    }

    /// Size unit: `k`, `m`, or `g`.
    #[must_use]
    pub fn unit(&self) -> char {
        self.unit
    }

    /// Path masks the sizes are shown for.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

/// `week_start <sunday|monday>`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WeekStart {
    /// Weekly stats reset on Sunday.
    #[default]
    Sunday,
    /// Weekly stats reset on Monday.
    Monday,
}

impl WeekStart {
    pub(crate) fn from_token(token: &str) -> Result<Self, ConfigError> {
        match token.to_ascii_lowercase().as_str() {
            "sunday" => Ok(Self::Sunday),
            "monday" => Ok(Self::Monday),
            other => Err(ConfigError::value(format!(
                "week_start must be sunday or monday, not '{other}'"
            ))),
        }
    }
}

/// `epsv_fxp <allow|deny|force>`
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum EpsvFxp {
    /// EPSV may be used for FXP.
    #[default]
    Allow,
    /// EPSV is refused for FXP.
    Deny,
    /// EPSV is required for FXP.
    Force,
}

impl EpsvFxp {
    pub(crate) fn from_token(token: &str) -> Result<Self, ConfigError> {
        match token.to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "deny" => Ok(Self::Deny),
            "force" => Ok(Self::Force),
            other => Err(ConfigError::value(format!(
                "epsv_fxp must be allow, deny or force, not '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acl::AuthContext;

    fn toks(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn ports_parse_ranges_and_singles() {
        let ports = Ports::from_tokens(&toks(&["2000-2009", "2020"])).unwrap();
        assert_eq!(ports.ranges().len(), 2);
        assert_eq!(ports.ranges()[0].from(), 2000);
        assert_eq!(ports.ranges()[0].to(), 2009);
        assert_eq!(ports.ranges()[1].from(), 2020);
        assert_eq!(ports.ranges()[1].to(), 2020);
    }

    #[test]
    fn ports_reject_inverted_range() {
        assert!(Ports::from_tokens(&toks(&["2009-2000"])).is_err());
    }

    #[test]
    fn ports_reject_out_of_bounds() {
        assert!(Ports::from_tokens(&toks(&["900-1000"])).is_err());
        assert!(Ports::from_tokens(&toks(&["65000-70000"])).is_err());
        assert!(Ports::from_tokens(&toks(&["abc"])).is_err());
    }

    #[test]
    fn speed_limit_parses_path_limits_and_acl() {
        let limit =
            SpeedLimit::from_tokens(&toks(&["/site/incoming/*", "1000", "500", "!@leech", "*"]))
                .unwrap();
        assert_eq!(limit.path(), "/site/incoming/*");
        assert_eq!(limit.dl_limit(), 1000);
        assert_eq!(limit.ul_limit(), 500);
        assert!(limit.matches("/site/incoming/release"));
        assert!(!limit.matches("/site/archive/release"));
        assert!(!limit.acl().evaluate(&AuthContext::new("u", "leech", "")));
        assert!(limit.acl().evaluate(&AuthContext::new("u", "users", "")));
    }

    #[test]
    fn idle_timeout_enforces_ordering() {
        assert!(IdleTimeout::new(100, 200, 150).is_err());
        assert!(IdleTimeout::new(7200, 1, 0).is_err());
        assert!(IdleTimeout::new(7200, 10, 5).is_err());
        let idle = IdleTimeout::new(7200, 1, 900).unwrap();
        assert_eq!(idle.maximum(), Duration::from_secs(7200));
        assert_eq!(idle.minimum(), Duration::from_secs(1));
        assert_eq!(idle.timeout(), Duration::from_secs(900));
    }

    #[test]
    fn idle_timeout_token_order_is_timeout_min_max() {
        let idle = IdleTimeout::from_tokens(&toks(&["900", "1", "7200"])).unwrap();
        assert_eq!(idle, IdleTimeout::default());
    }

    #[test]
    fn site_cmd_kind_is_matched_by_name() {
        let cmd = SiteCmd::from_tokens(&toks(&["wipe", "EXEC", "/bin/wipe"])).unwrap();
        assert_eq!(cmd.command(), "WIPE");
        assert_eq!(cmd.kind(), SiteCmdKind::Exec);
        assert_eq!(cmd.target(), "/bin/wipe");
        assert!(cmd.description().is_none());

        let cmd =
            SiteCmd::from_tokens(&toks(&["rules", "text", "/ftp-data/rules", "Show the rules"]));
        let cmd = cmd.unwrap();
        assert_eq!(cmd.kind(), SiteCmdKind::Text);
        assert_eq!(cmd.description(), Some("Show the rules"));

        assert!(SiteCmd::from_tokens(&toks(&["x", "magic", "/bin/x"])).is_err());
    }

    #[test]
    fn nukedir_style_action_names() {
        let style =
            NukedirStyle::from_tokens(&toks(&["NUKED-%N", "DeleteFiles", "1M"])).unwrap();
        assert_eq!(style.action(), NukedirAction::DeleteFiles);
        assert_eq!(style.min_size(), 1024);
        assert!(NukedirStyle::from_tokens(&toks(&["N-%N", "2", "1024"])).is_err());
    }

    #[test]
    fn cscript_position_names() {
        let script = Cscript::from_tokens(&toks(&["retr", "pre", "/scripts/check"])).unwrap();
        assert_eq!(script.command(), "RETR");
        assert_eq!(script.when(), CscriptWhen::Pre);
        assert!(Cscript::from_tokens(&toks(&["retr", "during", "/x"])).is_err());
    }

    #[test]
    fn allow_fxp_default_is_permissive() {
        let fxp = AllowFxp::default();
        assert!(fxp.downloads());
        assert!(fxp.uploads());
        assert!(!fxp.logging());
        assert!(fxp.acl().evaluate(&AuthContext::new("u", "g", "")));
    }

    #[test]
    fn ascii_downloads_size_and_masks() {
        let ascii = AsciiDownloads::from_tokens(&toks(&["200", "*.txt", "*.nfo"])).unwrap();
        assert!(ascii.allowed(100, "readme.txt"));
        assert!(!ascii.allowed(300, "readme.txt"));
        assert!(!ascii.allowed(100, "release.zip"));

        let unlimited = AsciiDownloads::from_tokens(&toks(&["0"])).unwrap();
        assert!(unlimited.allowed(i64::MAX, "anything"));
    }

    #[test]
    fn lastonline_kind_names() {
        let last = Lastonline::from_tokens(&toks(&["timeout", "25"])).unwrap();
        assert_eq!(last.kind(), LastonlineKind::Timeout);
        assert_eq!(last.max(), 25);
        assert!(Lastonline::from_tokens(&toks(&["sometimes"])).is_err());
    }

    #[test]
    fn path_filter_compiles_regex() {
        let filter = PathFilter::from_tokens(&toks(&[
            "/ftp-data/misc/badname",
            "^[A-Za-z0-9._-]+$",
            "*",
        ]))
        .unwrap();
        assert!(filter.regex().is_match("good-name.zip"));
        assert!(!filter.regex().is_match("bad name!"));
        assert!(PathFilter::from_tokens(&toks(&["/m", "([", "*"])).is_err());
    }

    #[test]
    fn malformed_acl_tail_fails_the_setting() {
        assert!(SpeedLimit::from_tokens(&toks(&["/x", "10", "10", "!"])).is_err());
    }
}
