//! Config file loading and the immutable [`Config`] snapshot.
//!
//! The loader reads the file line by line, strips comments, tokenizes,
//! and dispatches each keyword through the [`Factory`] registry. Unknown
//! keywords are logged and skipped; every other error aborts the load
//! with the file and line number attached. After the last line, defaults
//! are applied, required settings are checked, and the snapshot gets the
//! next process-wide version number.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use acl::{Acl, AuthContext};
use rustc_hash::FxHashMap;
use tracing::warn;

use crate::error::ConfigError;
use crate::factory::Factory;
use crate::setting::{
    AclInt, AclWithPath, Alias, AllowFxp, AsciiDownloads, AsciiUploads, Creditcheck, Creditloss,
    Cscript, DupeCheck, EpsvFxp, HiddenFiles, IdleTimeout, Lastonline, Lslong, MaxUsers, Msgpath,
    NukedirStyle, PasvAddr, PathFilter, Ports, Privgroup, Privpath, Requests, Right, Script,
    SecureIp, SecurePass, ShowTotals, SimXfers, SiteCmd, SpeedLimit, StatSection, UseDirSize,
    WeekStart,
};
use crate::util;

/// Default config file name used by the search path.
pub const CONFIG_FILE: &str = "ebftpd.conf";

/// Directories searched, in order, when no explicit path is given.
const CONFIG_SEARCH: &[&str] = &["../etc", "etc", "."];

/// Settings that must appear in every config file.
const REQUIRED_SETTINGS: &[&str] = &["sitepath", "datapath", "port", "valid_ip"];

/// Command names a `-<keyword>` ACL line may refer to.
///
/// The command dispatch layer owns the authoritative registry; this list
/// mirrors the RFC command set it installs so config validation does not
/// depend on it.
const KNOWN_COMMANDS: &[&str] = &[
    "abor", "acct", "adat", "allo", "appe", "auth", "ccc", "cdup", "conf", "cwd", "dele", "enc",
    "eprt", "epsv", "feat", "help", "lang", "list", "lprt", "lpsv", "mdtm", "mff", "mic", "mkd",
    "mlsd", "mlst", "mode", "nlst", "noop", "opts", "pass", "pasv", "pbsz", "port", "prot", "pwd",
    "quit", "rein", "rest", "retr", "rmd", "rnfr", "rnto", "site", "size", "smnt", "stat", "stor",
    "stou", "stru", "syst", "type", "user", "xcup", "xcwd", "xmkd", "xpwd", "xrmd",
];

static LATEST_VERSION: AtomicI32 = AtomicI32::new(0);

/// A named stats section covering one or more path masks.
#[derive(Clone, Debug)]
pub struct Section {
    name: String,
    paths: Vec<String>,
    separate_credits: bool,
    ratio: Option<i32>,
}

impl Section {
    fn new(name: String) -> Self {
        Self {
            name,
            paths: Vec::new(),
            separate_credits: false,
            ratio: None,
        }
    }

    /// Section name, upper-cased.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path masks belonging to the section.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Whether the section keeps its own credit pool.
    #[must_use]
    pub fn separate_credits(&self) -> bool {
        self.separate_credits
    }

    /// Section-specific ratio override, if any.
    #[must_use]
    pub fn ratio(&self) -> Option<i32> {
        self.ratio
    }

    /// Whether a virtual path falls inside the section.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        util::wildcard_match_any(&self.paths, path)
    }
}

/// The immutable configuration snapshot.
///
/// Built once per load; shared read-only behind [`Arc`]. A reload builds
/// a fresh snapshot with a higher [`version`](Config::version) and swaps
/// it into the process-wide slot — no field of a live `Config` is ever
/// mutated.
#[derive(Debug)]
pub struct Config {
    pub(crate) version: i32,
    pub(crate) tool: bool,
    pub(crate) seen: FxHashMap<String, u32>,

    // core paths and scalars
    pub(crate) sitepath: PathBuf,
    pub(crate) datapath: PathBuf,
    pub(crate) pidfile: Option<PathBuf>,
    pub(crate) tls_certificate: Option<PathBuf>,
    pub(crate) tls_ciphers: Option<String>,
    pub(crate) port: u16,
    pub(crate) banner: Option<PathBuf>,
    pub(crate) login_prompt: String,
    pub(crate) sitename_long: String,
    pub(crate) sitename_short: String,
    pub(crate) email: Option<String>,
    pub(crate) tagline: Option<String>,
    pub(crate) timezone: i32,
    pub(crate) mmap_amount: i64,
    pub(crate) dl_sendfile: i64,
    pub(crate) ul_buffered_force: i64,
    pub(crate) free_space: i64,
    pub(crate) total_users: i32,
    pub(crate) multiplier_max: i32,
    pub(crate) empty_nuke: i64,
    pub(crate) max_sitecmd_lines: i32,
    pub(crate) maximum_ratio: i32,
    pub(crate) dir_size_depth: i32,
    pub(crate) oneliners: i32,
    pub(crate) min_homedir: Option<PathBuf>,
    pub(crate) reload_config: Option<PathBuf>,
    pub(crate) pwd_path: Option<PathBuf>,
    pub(crate) grp_path: Option<PathBuf>,
    pub(crate) botscript_path: Option<PathBuf>,

    // booleans
    pub(crate) color_mode: bool,
    pub(crate) dl_incomplete: bool,
    pub(crate) file_dl_count: bool,
    pub(crate) bouncer_only: bool,
    pub(crate) async_crc: bool,

    // accumulating string lists
    pub(crate) master: Vec<String>,
    pub(crate) bouncer_ip: Vec<String>,
    pub(crate) calc_crc: Vec<String>,
    pub(crate) xdupe: Vec<String>,
    pub(crate) valid_ip: Vec<String>,
    pub(crate) active_addr: Vec<String>,
    pub(crate) ignore_type: Vec<String>,
    pub(crate) banned_users: Vec<String>,
    pub(crate) idle_commands: Vec<String>,
    pub(crate) noretrieve: Vec<String>,
    pub(crate) nodupecheck: Vec<PathBuf>,
    pub(crate) cdpath: Vec<PathBuf>,
    pub(crate) event_path: Vec<String>,
    pub(crate) dupe_path: Vec<String>,
    pub(crate) index_path: Vec<String>,

    // ACL-only settings
    pub(crate) shutdown: Acl,
    pub(crate) hideuser: Acl,
    pub(crate) tls_control: Acl,
    pub(crate) tls_listing: Acl,
    pub(crate) tls_data: Acl,
    pub(crate) tls_fxp: Acl,

    // single-valued composites
    pub(crate) ascii_downloads: AsciiDownloads,
    pub(crate) ascii_uploads: AsciiUploads,
    pub(crate) sim_xfers: SimXfers,
    pub(crate) active_ports: Ports,
    pub(crate) pasv_ports: Ports,
    pub(crate) max_users: MaxUsers,
    pub(crate) lslong: Lslong,
    pub(crate) requests: Requests,
    pub(crate) lastonline: Lastonline,
    pub(crate) dupe_check: Option<DupeCheck>,
    pub(crate) nukedir_style: NukedirStyle,
    pub(crate) idle_timeout: IdleTimeout,
    pub(crate) week_start: WeekStart,
    pub(crate) epsv_fxp: EpsvFxp,

    // accumulating composites
    pub(crate) secure_ip: Vec<SecureIp>,
    pub(crate) secure_pass: Vec<SecurePass>,
    pub(crate) speed_limit: Vec<SpeedLimit>,
    pub(crate) pasv_addr: Vec<PasvAddr>,
    pub(crate) allow_fxp: Vec<AllowFxp>,
    pub(crate) welcome_msg: Vec<AclWithPath>,
    pub(crate) goodbye_msg: Vec<AclWithPath>,
    pub(crate) newsfile: Vec<AclWithPath>,
    pub(crate) alias: Vec<Alias>,
    pub(crate) use_dir_size: Vec<UseDirSize>,

    // rights, first matching path mask wins
    pub(crate) delete: Vec<Right>,
    pub(crate) deleteown: Vec<Right>,
    pub(crate) overwrite: Vec<Right>,
    pub(crate) resume: Vec<Right>,
    pub(crate) rename: Vec<Right>,
    pub(crate) renameown: Vec<Right>,
    pub(crate) filemove: Vec<Right>,
    pub(crate) makedir: Vec<Right>,
    pub(crate) upload: Vec<Right>,
    pub(crate) download: Vec<Right>,
    pub(crate) nuke: Vec<Right>,
    pub(crate) dirlog: Vec<Right>,
    pub(crate) hideinwho: Vec<Right>,
    pub(crate) freefile: Vec<Right>,
    pub(crate) nostats: Vec<Right>,
    pub(crate) show_diz: Vec<Right>,

    pub(crate) stat_section: Vec<StatSection>,
    pub(crate) path_filter: Vec<PathFilter>,
    pub(crate) max_ustats: Vec<AclInt>,
    pub(crate) max_gstats: Vec<AclInt>,
    pub(crate) show_totals: Vec<ShowTotals>,
    pub(crate) script: Vec<Script>,
    pub(crate) hidden_files: Vec<HiddenFiles>,
    pub(crate) creditcheck: Vec<Creditcheck>,
    pub(crate) creditloss: Vec<Creditloss>,
    pub(crate) privgroup: Vec<Privgroup>,
    pub(crate) msg_path: Vec<Msgpath>,
    pub(crate) privpath: Vec<Privpath>,
    pub(crate) site_cmd: Vec<SiteCmd>,
    pub(crate) cscript: Vec<Cscript>,

    pub(crate) sections: FxHashMap<String, Section>,
    pub(crate) command_acls: FxHashMap<String, Acl>,
}

impl Config {
    fn with_defaults(tool: bool) -> Self {
        Self {
            version: 0,
            tool,
            seen: FxHashMap::default(),
            sitepath: PathBuf::new(),
            datapath: PathBuf::from("data"),
            pidfile: None,
            tls_certificate: None,
            tls_ciphers: None,
            port: 0,
            banner: None,
            login_prompt: String::new(),
            sitename_long: "EBFTPD".to_owned(),
            sitename_short: "EB".to_owned(),
            email: None,
            tagline: None,
            timezone: 0,
            mmap_amount: 0,
            dl_sendfile: 0,
            ul_buffered_force: 0,
            free_space: 1_048_576,
            total_users: -1,
            multiplier_max: 10,
            empty_nuke: 102_400,
            max_sitecmd_lines: 100,
            maximum_ratio: 10,
            dir_size_depth: 2,
            oneliners: 10,
            min_homedir: None,
            reload_config: None,
            pwd_path: None,
            grp_path: None,
            botscript_path: None,
            color_mode: false,
            dl_incomplete: true,
            file_dl_count: true,
            bouncer_only: false,
            async_crc: false,
            master: Vec::new(),
            bouncer_ip: Vec::new(),
            calc_crc: Vec::new(),
            xdupe: Vec::new(),
            valid_ip: Vec::new(),
            active_addr: Vec::new(),
            ignore_type: Vec::new(),
            banned_users: Vec::new(),
            idle_commands: Vec::new(),
            noretrieve: Vec::new(),
            nodupecheck: Vec::new(),
            cdpath: Vec::new(),
            event_path: Vec::new(),
            dupe_path: Vec::new(),
            index_path: Vec::new(),
            shutdown: Acl::default(),
            hideuser: Acl::default(),
            tls_control: Acl::permit_all(),
            tls_listing: Acl::permit_all(),
            tls_data: Acl::from_string("!*").unwrap_or_default(),
            tls_fxp: Acl::from_string("!*").unwrap_or_default(),
            ascii_downloads: AsciiDownloads::default(),
            ascii_uploads: AsciiUploads::default(),
            sim_xfers: SimXfers::default(),
            active_ports: Ports::default(),
            pasv_ports: Ports::default(),
            max_users: MaxUsers::default(),
            lslong: Lslong::default(),
            requests: Requests::default(),
            lastonline: Lastonline::default(),
            dupe_check: None,
            nukedir_style: NukedirStyle::default(),
            idle_timeout: IdleTimeout::default(),
            week_start: WeekStart::default(),
            epsv_fxp: EpsvFxp::default(),
            secure_ip: Vec::new(),
            secure_pass: Vec::new(),
            speed_limit: Vec::new(),
            pasv_addr: Vec::new(),
            allow_fxp: Vec::new(),
            welcome_msg: Vec::new(),
            goodbye_msg: Vec::new(),
            newsfile: Vec::new(),
            alias: Vec::new(),
            use_dir_size: Vec::new(),
            delete: Vec::new(),
            deleteown: Vec::new(),
            overwrite: Vec::new(),
            resume: Vec::new(),
            rename: Vec::new(),
            renameown: Vec::new(),
            filemove: Vec::new(),
            makedir: Vec::new(),
            upload: Vec::new(),
            download: Vec::new(),
            nuke: Vec::new(),
            dirlog: Vec::new(),
            hideinwho: Vec::new(),
            freefile: Vec::new(),
            nostats: Vec::new(),
            show_diz: Vec::new(),
            stat_section: Vec::new(),
            path_filter: Vec::new(),
            max_ustats: Vec::new(),
            max_gstats: Vec::new(),
            show_totals: Vec::new(),
            script: Vec::new(),
            hidden_files: Vec::new(),
            creditcheck: Vec::new(),
            creditloss: Vec::new(),
            privgroup: Vec::new(),
            msg_path: Vec::new(),
            privpath: Vec::new(),
            site_cmd: Vec::new(),
            cscript: Vec::new(),
            sections: FxHashMap::default(),
            command_acls: FxHashMap::default(),
        }
    }

    /// Loads a config file and returns an immutable snapshot.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] when the file cannot be read, a line fails to
    /// parse, or the post-parse sanity check fails. Unknown keywords are
    /// logged and skipped, never fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<Self>, ConfigError> {
        Self::load_impl(path.as_ref(), false)
    }

    /// Loads a config file in tool mode.
    ///
    /// Tool mode relaxes the command-ACL keyword validation so offline
    /// tools can read configs referencing commands only the daemon's
    /// dispatch layer knows about.
    pub fn load_tool(path: impl AsRef<Path>) -> Result<Arc<Self>, ConfigError> {
        Self::load_impl(path.as_ref(), true)
    }

    /// Resolves the config path: an explicit path wins, otherwise the
    /// first `ebftpd.conf` found on the search path.
    #[must_use]
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        CONFIG_SEARCH
            .iter()
            .map(|dir| Path::new(dir).join(CONFIG_FILE))
            .find(|candidate| candidate.exists())
    }

    fn load_impl(path: &Path, tool: bool) -> Result<Arc<Self>, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::with_defaults(tool);
        let mut current_section: Option<String> = None;

        for (index, raw) in contents.lines().enumerate() {
            let line_number = index + 1;
            let line = match raw.find('#') {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let mut toks = util::split_compressed(line);
            if toks.is_empty() {
                continue;
            }
            let keyword = toks.remove(0).to_ascii_lowercase();
            *config.seen.entry(keyword.clone()).or_default() += 1;

            let result = if current_section.is_some() {
                config.parse_section_directive(&mut current_section, &keyword, &toks)
            } else {
                config.parse_directive(&mut current_section, &keyword, toks)
            };

            match result {
                Ok(()) => {}
                Err(ConfigError::NoSetting { keyword }) => {
                    warn!("{} ({}:{})", keyword, path.display(), line_number);
                }
                Err(err) => return Err(err.at(path, line_number)),
            }
        }

        config.finalise()?;
        Ok(Arc::new(config))
    }

    fn parse_directive(
        &mut self,
        current_section: &mut Option<String>,
        keyword: &str,
        toks: Vec<String>,
    ) -> Result<(), ConfigError> {
        if let Some(command) = keyword.strip_prefix("custom-") {
            return self.parse_custom_command_acl(keyword, command, &toks);
        }
        if let Some(command) = keyword.strip_prefix('-') {
            return self.parse_command_acl(keyword, command, &toks);
        }
        if keyword == "section" {
            if toks.len() != 1 {
                return Err(ConfigError::parameter_count(keyword));
            }
            let name = toks[0].to_ascii_uppercase();
            if self.sections.contains_key(&name) {
                return Err(ConfigError::value(format!(
                    "section {name} already exists"
                )));
            }
            self.sections.insert(name.clone(), Section::new(name.clone()));
            *current_section = Some(name);
            return Ok(());
        }
        Factory::global().dispatch(self, keyword, toks)
    }

    fn parse_command_acl(
        &mut self,
        keyword: &str,
        command: &str,
        toks: &[String],
    ) -> Result<(), ConfigError> {
        if toks.is_empty() {
            return Err(ConfigError::parameter_count(keyword));
        }
        if !self.tool && !KNOWN_COMMANDS.contains(&command) {
            return Err(ConfigError::value(format!(
                "invalid command acl keyword '{command}'"
            )));
        }
        let acl = Acl::from_string(&toks.join(" "))?;
        self.command_acls.insert(command.to_owned(), acl);
        Ok(())
    }

    fn parse_custom_command_acl(
        &mut self,
        keyword: &str,
        command: &str,
        toks: &[String],
    ) -> Result<(), ConfigError> {
        if toks.is_empty() {
            return Err(ConfigError::parameter_count(keyword));
        }
        let upper = command.to_ascii_uppercase();
        if !self.tool && !self.site_cmd.iter().any(|cmd| cmd.command() == upper) {
            return Err(ConfigError::value(format!(
                "invalid custom command acl keyword '{upper}'"
            )));
        }
        let acl = Acl::from_string(&toks.join(" "))?;
        self.command_acls.insert(keyword.to_owned(), acl);
        Ok(())
    }

    fn parse_section_directive(
        &mut self,
        current_section: &mut Option<String>,
        keyword: &str,
        toks: &[String],
    ) -> Result<(), ConfigError> {
        if keyword == "endsection" {
            *current_section = None;
            return Ok(());
        }
        let name = current_section.as_deref().unwrap_or_default();
        let Some(section) = self.sections.get_mut(name) else {
            return Err(ConfigError::value("section directive outside a section"));
        };
        match keyword {
            "path" => {
                if toks.len() != 1 {
                    return Err(ConfigError::parameter_count(keyword));
                }
                section.paths.push(toks[0].clone());
            }
            "separate_credits" => {
                if toks.len() != 1 {
                    return Err(ConfigError::parameter_count(keyword));
                }
                section.separate_credits = util::parse_bool(&toks[0])?;
            }
            "ratio" => {
                if toks.len() != 1 {
                    return Err(ConfigError::parameter_count(keyword));
                }
                section.ratio = Some(util::parse_nonneg(&toks[0])? as i32);
            }
            other => {
                return Err(ConfigError::value(format!(
                    "invalid section config option '{other}'"
                )));
            }
        }
        Ok(())
    }

    fn finalise(&mut self) -> Result<(), ConfigError> {
        for keyword in REQUIRED_SETTINGS {
            if !self.seen.contains_key(*keyword) {
                return Err(ConfigError::Required { keyword });
            }
        }
        if self.login_prompt.is_empty() {
            self.login_prompt = format!("{}: ebftpd connected.", self.sitename_long);
        }
        if self.allow_fxp.is_empty() {
            self.allow_fxp.push(AllowFxp::default());
        }
        self.version = LATEST_VERSION.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(())
    }

    /// The snapshot's version; strictly increasing across successful
    /// loads within a process.
    #[must_use]
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Whether the config was loaded in tool mode.
    #[must_use]
    pub fn tool(&self) -> bool {
        self.tool
    }

    /// The ACL guarding a command, as configured by `-<keyword>` or
    /// `custom-<command>` lines. Query with the bare command keyword
    /// (`"retr"`) or the full custom key (`"custom-wipe"`).
    #[must_use]
    pub fn command_acl(&self, keyword: &str) -> Option<&Acl> {
        self.command_acls.get(keyword)
    }

    /// The site root directory.
    #[must_use]
    pub fn sitepath(&self) -> &Path {
        &self.sitepath
    }

    /// The daemon data directory.
    #[must_use]
    pub fn datapath(&self) -> &Path {
        &self.datapath
    }

    /// PID file location, if configured.
    #[must_use]
    pub fn pidfile(&self) -> Option<&Path> {
        self.pidfile.as_deref()
    }

    /// TLS certificate path, if configured.
    #[must_use]
    pub fn tls_certificate(&self) -> Option<&Path> {
        self.tls_certificate.as_deref()
    }

    /// TLS cipher list, if configured.
    #[must_use]
    pub fn tls_ciphers(&self) -> Option<&str> {
        self.tls_ciphers.as_deref()
    }

    /// Control connection listen port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Pre-login banner file, if configured.
    #[must_use]
    pub fn banner(&self) -> Option<&Path> {
        self.banner.as_deref()
    }

    /// Login prompt shown before authentication.
    #[must_use]
    pub fn login_prompt(&self) -> &str {
        &self.login_prompt
    }

    /// Long site name.
    #[must_use]
    pub fn sitename_long(&self) -> &str {
        &self.sitename_long
    }

    /// Short site name.
    #[must_use]
    pub fn sitename_short(&self) -> &str {
        &self.sitename_short
    }

    /// Site contact address, if configured.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Site tagline, if configured.
    #[must_use]
    pub fn tagline(&self) -> Option<&str> {
        self.tagline.as_deref()
    }

    /// Display timezone offset in hours.
    #[must_use]
    pub fn timezone(&self) -> i32 {
        self.timezone
    }

    /// mmap threshold (KB) for file transfers.
    #[must_use]
    pub fn mmap_amount(&self) -> i64 {
        self.mmap_amount
    }

    /// sendfile threshold (KB) for downloads.
    #[must_use]
    pub fn dl_sendfile(&self) -> i64 {
        self.dl_sendfile
    }

    /// Forced buffering threshold (KB) for uploads.
    #[must_use]
    pub fn ul_buffered_force(&self) -> i64 {
        self.ul_buffered_force
    }

    /// Minimum free space (KB) required for uploads.
    #[must_use]
    pub fn free_space(&self) -> i64 {
        self.free_space
    }

    /// Maximum user accounts; `-1` for unlimited.
    #[must_use]
    pub fn total_users(&self) -> i32 {
        self.total_users
    }

    /// Largest configurable credit multiplier.
    #[must_use]
    pub fn multiplier_max(&self) -> i32 {
        self.multiplier_max
    }

    /// Penalty (KB) for nuking an empty directory.
    #[must_use]
    pub fn empty_nuke(&self) -> i64 {
        self.empty_nuke
    }

    /// Maximum lines a SITE command may output.
    #[must_use]
    pub fn max_sitecmd_lines(&self) -> i32 {
        self.max_sitecmd_lines
    }

    /// Largest configurable ratio.
    #[must_use]
    pub fn maximum_ratio(&self) -> i32 {
        self.maximum_ratio
    }

    /// Directory depth for computed directory sizes.
    #[must_use]
    pub fn dir_size_depth(&self) -> i32 {
        self.dir_size_depth
    }

    /// One-liner entries kept.
    #[must_use]
    pub fn oneliners(&self) -> i32 {
        self.oneliners
    }

    /// Minimum home directory prefix, if configured.
    #[must_use]
    pub fn min_homedir(&self) -> Option<&Path> {
        self.min_homedir.as_deref()
    }

    /// Reload trigger file, if configured.
    #[must_use]
    pub fn reload_config(&self) -> Option<&Path> {
        self.reload_config.as_deref()
    }

    /// Legacy passwd file path, if configured.
    #[must_use]
    pub fn pwd_path(&self) -> Option<&Path> {
        self.pwd_path.as_deref()
    }

    /// Legacy group file path, if configured.
    #[must_use]
    pub fn grp_path(&self) -> Option<&Path> {
        self.grp_path.as_deref()
    }

    /// Sitebot script path, if configured.
    #[must_use]
    pub fn botscript_path(&self) -> Option<&Path> {
        self.botscript_path.as_deref()
    }

    /// Whether ANSI colour output is enabled.
    #[must_use]
    pub fn color_mode(&self) -> bool {
        self.color_mode
    }

    /// Whether incomplete downloads count toward stats.
    #[must_use]
    pub fn dl_incomplete(&self) -> bool {
        self.dl_incomplete
    }

    /// Whether per-file download counting is enabled.
    #[must_use]
    pub fn file_dl_count(&self) -> bool {
        self.file_dl_count
    }

    /// Whether logins must come through a bouncer.
    #[must_use]
    pub fn bouncer_only(&self) -> bool {
        self.bouncer_only
    }

    /// Whether CRC calculation runs asynchronously.
    #[must_use]
    pub fn async_crc(&self) -> bool {
        self.async_crc
    }

    /// Siteop account names.
    #[must_use]
    pub fn master(&self) -> &[String] {
        &self.master
    }

    /// Known bouncer addresses.
    #[must_use]
    pub fn bouncer_ip(&self) -> &[String] {
        &self.bouncer_ip
    }

    /// Masks of files that get CRC-checked.
    #[must_use]
    pub fn calc_crc(&self) -> &[String] {
        &self.calc_crc
    }

    /// X-DUPE masks.
    #[must_use]
    pub fn xdupe(&self) -> &[String] {
        &self.xdupe
    }

    /// Identity masks a connecting IP must match.
    #[must_use]
    pub fn valid_ip(&self) -> &[String] {
        &self.valid_ip
    }

    /// Addresses used for active-mode data connections.
    #[must_use]
    pub fn active_addr(&self) -> &[String] {
        &self.active_addr
    }

    /// File masks excluded from transfer stats.
    #[must_use]
    pub fn ignore_type(&self) -> &[String] {
        &self.ignore_type
    }

    /// Forbidden account names.
    #[must_use]
    pub fn banned_users(&self) -> &[String] {
        &self.banned_users
    }

    /// Commands that do not reset the idle timer, upper-cased.
    #[must_use]
    pub fn idle_commands(&self) -> &[String] {
        &self.idle_commands
    }

    /// Masks of files that may never be downloaded.
    #[must_use]
    pub fn noretrieve(&self) -> &[String] {
        &self.noretrieve
    }

    /// Paths exempt from dupe checking.
    #[must_use]
    pub fn nodupecheck(&self) -> &[PathBuf] {
        &self.nodupecheck
    }

    /// Extra directories searched by CWD.
    #[must_use]
    pub fn cdpath(&self) -> &[PathBuf] {
        &self.cdpath
    }

    /// Path masks whose events are logged.
    #[must_use]
    pub fn event_path(&self) -> &[String] {
        &self.event_path
    }

    /// Path masks recorded in the dupe log.
    #[must_use]
    pub fn dupe_path(&self) -> &[String] {
        &self.dupe_path
    }

    /// Path masks added to the site index.
    #[must_use]
    pub fn index_path(&self) -> &[String] {
        &self.index_path
    }

    /// Users allowed to issue SITE SHUTDOWN.
    #[must_use]
    pub fn shutdown(&self) -> &Acl {
        &self.shutdown
    }

    /// Users hidden from online listings.
    #[must_use]
    pub fn hideuser(&self) -> &Acl {
        &self.hideuser
    }

    /// Users required to secure the control connection.
    #[must_use]
    pub fn tls_control(&self) -> &Acl {
        &self.tls_control
    }

    /// Users required to secure directory listings.
    #[must_use]
    pub fn tls_listing(&self) -> &Acl {
        &self.tls_listing
    }

    /// Users required to secure data transfers.
    #[must_use]
    pub fn tls_data(&self) -> &Acl {
        &self.tls_data
    }

    /// Users required to secure FXP transfers.
    #[must_use]
    pub fn tls_fxp(&self) -> &Acl {
        &self.tls_fxp
    }

    /// ASCII download policy.
    #[must_use]
    pub fn ascii_downloads(&self) -> &AsciiDownloads {
        &self.ascii_downloads
    }

    /// ASCII upload policy.
    #[must_use]
    pub fn ascii_uploads(&self) -> &AsciiUploads {
        &self.ascii_uploads
    }

    /// Simultaneous transfer slots.
    #[must_use]
    pub fn sim_xfers(&self) -> &SimXfers {
        &self.sim_xfers
    }

    /// Active-mode data port ranges.
    #[must_use]
    pub fn active_ports(&self) -> &Ports {
        &self.active_ports
    }

    /// Passive-mode data port ranges.
    #[must_use]
    pub fn pasv_ports(&self) -> &Ports {
        &self.pasv_ports
    }

    /// Login slot limits.
    #[must_use]
    pub fn max_users(&self) -> &MaxUsers {
        &self.max_users
    }

    /// Directory listing options.
    #[must_use]
    pub fn lslong(&self) -> &Lslong {
        &self.lslong
    }

    /// Request file configuration.
    #[must_use]
    pub fn requests(&self) -> &Requests {
        &self.requests
    }

    /// Last-online tracking configuration.
    #[must_use]
    pub fn lastonline(&self) -> &Lastonline {
        &self.lastonline
    }

    /// Dupe checking configuration; `None` disables the check.
    #[must_use]
    pub fn dupe_check(&self) -> Option<&DupeCheck> {
        self.dupe_check.as_ref()
    }

    /// Nuked directory handling.
    #[must_use]
    pub fn nukedir_style(&self) -> &NukedirStyle {
        &self.nukedir_style
    }

    /// Idle timeout bounds.
    #[must_use]
    pub fn idle_timeout(&self) -> &IdleTimeout {
        &self.idle_timeout
    }

    /// First day of the stats week.
    #[must_use]
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// EPSV policy for FXP transfers.
    #[must_use]
    pub fn epsv_fxp(&self) -> EpsvFxp {
        self.epsv_fxp
    }

    /// IP mask strength requirements.
    #[must_use]
    pub fn secure_ip(&self) -> &[SecureIp] {
        &self.secure_ip
    }

    /// Password strength requirements.
    #[must_use]
    pub fn secure_pass(&self) -> &[SecurePass] {
        &self.secure_pass
    }

    /// Configured per-path speed limits.
    #[must_use]
    pub fn speed_limit(&self) -> &[SpeedLimit] {
        &self.speed_limit
    }

    /// Advertised passive addresses.
    #[must_use]
    pub fn pasv_addr(&self) -> &[PasvAddr] {
        &self.pasv_addr
    }

    /// FXP rules, first matching ACL wins.
    #[must_use]
    pub fn allow_fxp(&self) -> &[AllowFxp] {
        &self.allow_fxp
    }

    /// Welcome message files.
    #[must_use]
    pub fn welcome_msg(&self) -> &[AclWithPath] {
        &self.welcome_msg
    }

    /// Goodbye message files.
    #[must_use]
    pub fn goodbye_msg(&self) -> &[AclWithPath] {
        &self.goodbye_msg
    }

    /// News files shown after login.
    #[must_use]
    pub fn newsfile(&self) -> &[AclWithPath] {
        &self.newsfile
    }

    /// Directory aliases.
    #[must_use]
    pub fn alias(&self) -> &[Alias] {
        &self.alias
    }

    /// Computed directory size display rules.
    #[must_use]
    pub fn use_dir_size(&self) -> &[UseDirSize] {
        &self.use_dir_size
    }

    /// Delete rights.
    #[must_use]
    pub fn delete(&self) -> &[Right] {
        &self.delete
    }

    /// Delete-own rights.
    #[must_use]
    pub fn deleteown(&self) -> &[Right] {
        &self.deleteown
    }

    /// Overwrite rights.
    #[must_use]
    pub fn overwrite(&self) -> &[Right] {
        &self.overwrite
    }

    /// Resume rights.
    #[must_use]
    pub fn resume(&self) -> &[Right] {
        &self.resume
    }

    /// Rename rights.
    #[must_use]
    pub fn rename(&self) -> &[Right] {
        &self.rename
    }

    /// Rename-own rights.
    #[must_use]
    pub fn renameown(&self) -> &[Right] {
        &self.renameown
    }

    /// File move rights.
    #[must_use]
    pub fn filemove(&self) -> &[Right] {
        &self.filemove
    }

    /// Directory creation rights.
    #[must_use]
    pub fn makedir(&self) -> &[Right] {
        &self.makedir
    }

    /// Upload rights.
    #[must_use]
    pub fn upload(&self) -> &[Right] {
        &self.upload
    }

    /// Download rights.
    #[must_use]
    pub fn download(&self) -> &[Right] {
        &self.download
    }

    /// Nuke rights.
    #[must_use]
    pub fn nuke(&self) -> &[Right] {
        &self.nuke
    }

    /// Directory logging rules.
    #[must_use]
    pub fn dirlog(&self) -> &[Right] {
        &self.dirlog
    }

    /// Hide-in-who rules.
    #[must_use]
    pub fn hideinwho(&self) -> &[Right] {
        &self.hideinwho
    }

    /// Free file rules.
    #[must_use]
    pub fn freefile(&self) -> &[Right] {
        &self.freefile
    }

    /// No-stats rules.
    #[must_use]
    pub fn nostats(&self) -> &[Right] {
        &self.nostats
    }

    /// DIZ display rules.
    #[must_use]
    pub fn show_diz(&self) -> &[Right] {
        &self.show_diz
    }

    /// Legacy flat stat sections.
    #[must_use]
    pub fn stat_section(&self) -> &[StatSection] {
        &self.stat_section
    }

    /// Upload filename filters.
    #[must_use]
    pub fn path_filter(&self) -> &[PathFilter] {
        &self.path_filter
    }

    /// User stats display limits.
    #[must_use]
    pub fn max_ustats(&self) -> &[AclInt] {
        &self.max_ustats
    }

    /// Group stats display limits.
    #[must_use]
    pub fn max_gstats(&self) -> &[AclInt] {
        &self.max_gstats
    }

    /// Totals display rules.
    #[must_use]
    pub fn show_totals(&self) -> &[ShowTotals] {
        &self.show_totals
    }

    /// External scripts triggered on matching paths.
    #[must_use]
    pub fn script(&self) -> &[Script] {
        &self.script
    }

    /// Hidden file rules.
    #[must_use]
    pub fn hidden_files(&self) -> &[HiddenFiles] {
        &self.hidden_files
    }

    /// Per-path credit ratios.
    #[must_use]
    pub fn creditcheck(&self) -> &[Creditcheck] {
        &self.creditcheck
    }

    /// Per-path credit loss rules.
    #[must_use]
    pub fn creditloss(&self) -> &[Creditloss] {
        &self.creditloss
    }

    /// Privileged group registrations.
    #[must_use]
    pub fn privgroup(&self) -> &[Privgroup] {
        &self.privgroup
    }

    /// Directory message files.
    #[must_use]
    pub fn msg_path(&self) -> &[Msgpath] {
        &self.msg_path
    }

    /// Private path rules.
    #[must_use]
    pub fn privpath(&self) -> &[Privpath] {
        &self.privpath
    }

    /// Custom SITE command definitions.
    #[must_use]
    pub fn site_cmd(&self) -> &[SiteCmd] {
        &self.site_cmd
    }

    /// Pre/post command check scripts.
    #[must_use]
    pub fn cscript(&self) -> &[Cscript] {
        &self.cscript
    }

    /// Named stats sections.
    #[must_use]
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    /// The first section whose path masks cover the given path.
    #[must_use]
    pub fn section_match(&self, path: &str) -> Option<&Section> {
        self.sections.values().find(|section| section.is_match(path))
    }

    /// Whether an address belongs to a configured bouncer.
    #[must_use]
    pub fn is_bouncer(&self, ip: &str) -> bool {
        self.bouncer_ip.iter().any(|addr| addr == ip)
    }

    /// Whether events under the path are logged.
    #[must_use]
    pub fn is_event_logged(&self, path: &str) -> bool {
        !path.is_empty() && util::wildcard_match_any(&self.event_path, &with_trailing_slash(path))
    }

    /// Whether the path is recorded in the dupe log.
    #[must_use]
    pub fn is_dupe_logged(&self, path: &str) -> bool {
        !path.is_empty() && util::wildcard_match_any(&self.dupe_path, &with_trailing_slash(path))
    }

    /// Whether the path is added to the site index.
    #[must_use]
    pub fn is_indexed(&self, path: &str) -> bool {
        !path.is_empty() && util::wildcard_match_any(&self.index_path, &with_trailing_slash(path))
    }

    /// Download speed limits binding a transfer at `path` for the given
    /// client: path pattern matches, the limit's ACL admits the client,
    /// and a download ceiling is configured.
    #[must_use]
    pub fn download_limits_for(&self, path: &str, ctx: &AuthContext<'_>) -> Vec<&SpeedLimit> {
        self.speed_limit
            .iter()
            .filter(|limit| limit.dl_limit() > 0 && limit.matches(path) && limit.acl().evaluate(ctx))
            .collect()
    }

    /// Upload speed limits binding a transfer at `path` for the client.
    #[must_use]
    pub fn upload_limits_for(&self, path: &str, ctx: &AuthContext<'_>) -> Vec<&SpeedLimit> {
        self.speed_limit
            .iter()
            .filter(|limit| limit.ul_limit() > 0 && limit.matches(path) && limit.acl().evaluate(ctx))
            .collect()
    }
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_owned()
    } else {
        format!("{path}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub(crate) const MINIMAL: &str = "\
sitepath /site
datapath /data
port 2121
valid_ip *@127.0.0.1
";

    pub(crate) fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file.flush().expect("flush");
        file
    }

    #[test]
    fn minimal_config_loads_with_defaults() {
        let file = write_config(MINIMAL);
        let config = Config::load(file.path()).expect("load succeeds");
        assert_eq!(config.sitepath(), Path::new("/site"));
        assert_eq!(config.port(), 2121);
        assert_eq!(config.free_space(), 1_048_576);
        assert_eq!(config.sitename_long(), "EBFTPD");
        assert_eq!(config.login_prompt(), "EBFTPD: ebftpd connected.");
        assert_eq!(config.allow_fxp().len(), 1);
        assert_eq!(config.idle_timeout(), &IdleTimeout::default());
        assert!(config.tls_control().evaluate(&AuthContext::new("u", "g", "")));
        assert!(!config.tls_data().evaluate(&AuthContext::new("u", "g", "")));
    }

    #[test]
    fn version_strictly_increases() {
        let file = write_config(MINIMAL);
        let first = Config::load(file.path()).expect("first load");
        let second = Config::load(file.path()).expect("second load");
        assert!(second.version() > first.version());
    }

    #[test]
    fn missing_required_setting_fails() {
        let file = write_config("sitepath /site\ndatapath /data\nport 2121\n");
        let err = Config::load(file.path()).expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::Required { keyword: "valid_ip" }
        ));
    }

    #[test]
    fn unknown_keyword_is_skipped() {
        let file = write_config(&format!("{MINIMAL}some_glftpd_relic 1 2 3\n"));
        let config = Config::load(file.path()).expect("load succeeds");
        assert_eq!(config.port(), 2121);
    }

    #[test]
    fn parse_error_reports_line_number() {
        let file = write_config(&format!("{MINIMAL}max_users fifty 5\n"));
        let err = Config::load(file.path()).expect_err("must fail");
        assert_eq!(err.line(), Some(5));
        assert!(err.to_string().contains("fifty"));
    }

    #[test]
    fn comments_are_stripped_anywhere() {
        let file = write_config(&format!("{MINIMAL}free_space 2048 # two megs\n# whole line\n"));
        let config = Config::load(file.path()).expect("load succeeds");
        assert_eq!(config.free_space(), 2048);
    }

    #[test]
    fn single_valued_keyword_is_last_wins() {
        let file = write_config(&format!(
            "{MINIMAL}sitename_short AA\nsitename_short BB\n"
        ));
        let config = Config::load(file.path()).expect("load succeeds");
        assert_eq!(config.sitename_short(), "BB");
    }

    #[test]
    fn list_keywords_accumulate_in_order() {
        let file = write_config(&format!(
            "{MINIMAL}upload /incoming/* *\nupload /* !*\n"
        ));
        let config = Config::load(file.path()).expect("load succeeds");
        assert_eq!(config.upload().len(), 2);
        assert_eq!(config.upload()[0].path(), "/incoming/*");
    }

    #[test]
    fn open_failure_is_reported() {
        let err = Config::load("/nonexistent/ebftpd.conf").expect_err("must fail");
        assert!(matches!(err, ConfigError::Open { .. }));
    }

    #[test]
    fn command_acl_lines_are_collected() {
        let file = write_config(&format!("{MINIMAL}-retr !@leech *\n"));
        let config = Config::load(file.path()).expect("load succeeds");
        let acl = config.command_acl("retr").expect("retr acl present");
        assert!(!acl.evaluate(&AuthContext::new("u", "leech", "")));
        assert!(acl.evaluate(&AuthContext::new("u", "users", "")));
    }

    #[test]
    fn unknown_command_acl_keyword_fails_outside_tool_mode() {
        let file = write_config(&format!("{MINIMAL}-frobnicate *\n"));
        assert!(Config::load(file.path()).is_err());
        assert!(Config::load_tool(file.path()).is_ok());
    }

    #[test]
    fn custom_command_acl_requires_a_site_cmd() {
        let ok = write_config(&format!(
            "{MINIMAL}site_cmd wipe EXEC /bin/wipe\ncustom-wipe 1 @staff\n"
        ));
        let config = Config::load(ok.path()).expect("load succeeds");
        assert!(config.command_acl("custom-wipe").is_some());

        let bad = write_config(&format!("{MINIMAL}custom-wipe 1\n"));
        assert!(Config::load(bad.path()).is_err());
    }

    #[test]
    fn sections_collect_paths_until_endsection() {
        let file = write_config(&format!(
            "{MINIMAL}section mp3\npath /site/mp3/*\nratio 3\nendsection\nsection iso\npath /site/iso/*\nseparate_credits yes\nendsection\n"
        ));
        let config = Config::load(file.path()).expect("load succeeds");
        let section = config.section_match("/site/mp3/a").expect("match");
        assert_eq!(section.name(), "MP3");
        assert_eq!(section.ratio(), Some(3));
        assert!(config.section_match("/site/apps/a").is_none());
    }

    #[test]
    fn duplicate_section_fails() {
        let file = write_config(&format!(
            "{MINIMAL}section mp3\nendsection\nsection mp3\nendsection\n"
        ));
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn speed_limits_filter_by_path_and_acl() {
        let file = write_config(&format!(
            "{MINIMAL}speed_limit /site/incoming/* 1000 500 !@leech *\nspeed_limit /site/* 0 200 *\n"
        ));
        let config = Config::load(file.path()).expect("load succeeds");
        let leech = AuthContext::new("u", "leech", "");
        let user = AuthContext::new("u", "users", "");

        let dl = config.download_limits_for("/site/incoming/x", &user);
        assert_eq!(dl.len(), 1);
        assert_eq!(dl[0].dl_limit(), 1000);
        assert!(config.download_limits_for("/site/incoming/x", &leech).is_empty());

        // the second limit has no download ceiling but binds uploads
        let ul = config.upload_limits_for("/site/incoming/x", &user);
        assert_eq!(ul.len(), 2);
    }
}
