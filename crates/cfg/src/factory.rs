//! Keyword registry mapping each config directive to its parser.
//!
//! The table is a static list of `(keyword, arity, parse fn)` entries,
//! assembled into a hash map on first use — explicit construction, no
//! registration at static-init time. Arity is validated before the parse
//! function runs, so parsers may index their fixed positions directly.

use std::sync::OnceLock;

use acl::Acl;
use rustc_hash::FxHashMap;

use crate::config::Config;
use crate::error::ConfigError;
use crate::setting::{
    AclInt, AclWithPath, Alias, AllowFxp, AsciiDownloads, AsciiUploads, Creditcheck, Creditloss,
    Cscript, DupeCheck, EpsvFxp, HiddenFiles, IdleTimeout, Lastonline, Lslong, MaxUsers, Msgpath,
    NukedirStyle, PasvAddr, PathFilter, Ports, Privgroup, Privpath, Requests, Right, Script,
    SecureIp, SecurePass, ShowTotals, SimXfers, SiteCmd, SpeedLimit, StatSection, UseDirSize,
    WeekStart,
};
use crate::util;

type ParseFn = fn(&mut Config, Vec<String>) -> Result<(), ConfigError>;

struct Entry {
    keyword: &'static str,
    min: usize,
    max: Option<usize>,
    parse: ParseFn,
}

fn acl_of(toks: &[String]) -> Result<Acl, ConfigError> {
    Ok(Acl::from_string(&toks.join(" "))?)
}

fn parse_port(token: &str) -> Result<u16, ConfigError> {
    let value = util::parse_int(token)?;
    if !(1..=65535).contains(&value) {
        return Err(ConfigError::value(format!(
            "port '{token}' must be within 1-65535"
        )));
    }
    Ok(value as u16)
}

#[rustfmt::skip]
static TABLE: &[Entry] = &[
    // core paths and scalars
    Entry { keyword: "sitepath", min: 1, max: Some(1), parse: |c, t| { c.sitepath = t[0].clone().into(); Ok(()) } },
    Entry { keyword: "datapath", min: 1, max: Some(1), parse: |c, t| { c.datapath = t[0].clone().into(); Ok(()) } },
    Entry { keyword: "pidfile", min: 1, max: Some(1), parse: |c, t| { c.pidfile = Some(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "tls_certificate", min: 1, max: Some(1), parse: |c, t| { c.tls_certificate = Some(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "tls_ciphers", min: 1, max: Some(1), parse: |c, t| { c.tls_ciphers = Some(t[0].clone()); Ok(()) } },
    Entry { keyword: "port", min: 1, max: Some(1), parse: |c, t| { c.port = parse_port(&t[0])?; Ok(()) } },
    Entry { keyword: "banner", min: 1, max: Some(1), parse: |c, t| { c.banner = Some(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "login_prompt", min: 1, max: Some(1), parse: |c, t| { c.login_prompt = t[0].clone(); Ok(()) } },
    Entry { keyword: "sitename_long", min: 1, max: Some(1), parse: |c, t| { c.sitename_long = t[0].clone(); Ok(()) } },
    Entry { keyword: "sitename_short", min: 1, max: Some(1), parse: |c, t| { c.sitename_short = t[0].clone(); Ok(()) } },
    Entry { keyword: "email", min: 1, max: Some(1), parse: |c, t| { c.email = Some(t[0].clone()); Ok(()) } },
    Entry { keyword: "tagline", min: 1, max: Some(1), parse: |c, t| { c.tagline = Some(t[0].clone()); Ok(()) } },
    Entry { keyword: "timezone", min: 1, max: Some(1), parse: |c, t| { c.timezone = util::parse_int(&t[0])? as i32; Ok(()) } },
    Entry { keyword: "mmap_amount", min: 1, max: Some(1), parse: |c, t| { c.mmap_amount = util::parse_size(&t[0])?; Ok(()) } },
    Entry { keyword: "dl_sendfile", min: 1, max: Some(1), parse: |c, t| { c.dl_sendfile = util::parse_size(&t[0])?; Ok(()) } },
    Entry { keyword: "ul_buffered_force", min: 1, max: Some(1), parse: |c, t| { c.ul_buffered_force = util::parse_size(&t[0])?; Ok(()) } },
    Entry { keyword: "free_space", min: 1, max: Some(1), parse: |c, t| { c.free_space = util::parse_size(&t[0])?; Ok(()) } },
    Entry { keyword: "total_users", min: 1, max: Some(1), parse: |c, t| { c.total_users = util::parse_int(&t[0])? as i32; Ok(()) } },
    Entry { keyword: "multiplier_max", min: 1, max: Some(1), parse: |c, t| { c.multiplier_max = util::parse_nonneg(&t[0])? as i32; Ok(()) } },
    Entry { keyword: "empty_nuke", min: 1, max: Some(1), parse: |c, t| { c.empty_nuke = util::parse_size(&t[0])?; Ok(()) } },
    Entry { keyword: "max_sitecmd_lines", min: 1, max: Some(1), parse: |c, t| { c.max_sitecmd_lines = util::parse_int(&t[0])? as i32; Ok(()) } },
    Entry { keyword: "maximum_ratio", min: 1, max: Some(1), parse: |c, t| { c.maximum_ratio = util::parse_nonneg(&t[0])? as i32; Ok(()) } },
    Entry { keyword: "dir_size_depth", min: 1, max: Some(1), parse: |c, t| { c.dir_size_depth = util::parse_nonneg(&t[0])? as i32; Ok(()) } },
    Entry { keyword: "oneliners", min: 1, max: Some(1), parse: |c, t| { c.oneliners = util::parse_nonneg(&t[0])? as i32; Ok(()) } },
    Entry { keyword: "min_homedir", min: 1, max: Some(1), parse: |c, t| { c.min_homedir = Some(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "reload_config", min: 1, max: Some(1), parse: |c, t| { c.reload_config = Some(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "pwd_path", min: 1, max: Some(1), parse: |c, t| { c.pwd_path = Some(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "grp_path", min: 1, max: Some(1), parse: |c, t| { c.grp_path = Some(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "botscript_path", min: 1, max: Some(1), parse: |c, t| { c.botscript_path = Some(t[0].clone().into()); Ok(()) } },

    // booleans
    Entry { keyword: "color_mode", min: 1, max: Some(1), parse: |c, t| { c.color_mode = util::parse_bool(&t[0])?; Ok(()) } },
    Entry { keyword: "dl_incomplete", min: 1, max: Some(1), parse: |c, t| { c.dl_incomplete = util::parse_bool(&t[0])?; Ok(()) } },
    Entry { keyword: "file_dl_count", min: 1, max: Some(1), parse: |c, t| { c.file_dl_count = util::parse_bool(&t[0])?; Ok(()) } },
    Entry { keyword: "bouncer_only", min: 1, max: Some(1), parse: |c, t| { c.bouncer_only = util::parse_bool(&t[0])?; Ok(()) } },
    Entry { keyword: "async_crc", min: 1, max: Some(1), parse: |c, t| { c.async_crc = util::parse_bool(&t[0])?; Ok(()) } },

    // accumulating string lists
    Entry { keyword: "master", min: 1, max: None, parse: |c, t| { c.master.extend(t); Ok(()) } },
    Entry { keyword: "bouncer_ip", min: 1, max: None, parse: |c, t| { c.bouncer_ip.extend(t); Ok(()) } },
    Entry { keyword: "calc_crc", min: 1, max: None, parse: |c, t| { c.calc_crc.extend(t); Ok(()) } },
    Entry { keyword: "xdupe", min: 1, max: None, parse: |c, t| { c.xdupe.extend(t); Ok(()) } },
    Entry { keyword: "valid_ip", min: 1, max: None, parse: |c, t| { c.valid_ip.extend(t); Ok(()) } },
    Entry { keyword: "active_addr", min: 1, max: None, parse: |c, t| { c.active_addr.extend(t); Ok(()) } },
    Entry { keyword: "ignore_type", min: 1, max: None, parse: |c, t| { c.ignore_type.extend(t); Ok(()) } },
    Entry { keyword: "banned_users", min: 1, max: None, parse: |c, t| { c.banned_users.extend(t); Ok(()) } },
    Entry { keyword: "idle_commands", min: 1, max: None, parse: |c, t| { c.idle_commands.extend(t.into_iter().map(|cmd| cmd.to_ascii_uppercase())); Ok(()) } },
    Entry { keyword: "noretrieve", min: 1, max: None, parse: |c, t| { c.noretrieve.extend(t); Ok(()) } },
    Entry { keyword: "nodupecheck", min: 1, max: Some(1), parse: |c, t| { c.nodupecheck.push(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "cdpath", min: 1, max: Some(1), parse: |c, t| { c.cdpath.push(t[0].clone().into()); Ok(()) } },
    Entry { keyword: "event_path", min: 1, max: Some(1), parse: |c, t| { c.event_path.push(t[0].clone()); Ok(()) } },
    Entry { keyword: "dupe_path", min: 1, max: Some(1), parse: |c, t| { c.dupe_path.push(t[0].clone()); Ok(()) } },
    Entry { keyword: "index_path", min: 1, max: Some(1), parse: |c, t| { c.index_path.push(t[0].clone()); Ok(()) } },

    // ACL-only settings
    Entry { keyword: "shutdown", min: 1, max: None, parse: |c, t| { c.shutdown = acl_of(&t)?; Ok(()) } },
    Entry { keyword: "hideuser", min: 1, max: None, parse: |c, t| { c.hideuser = acl_of(&t)?; Ok(()) } },
    Entry { keyword: "tls_control", min: 1, max: None, parse: |c, t| { c.tls_control = acl_of(&t)?; Ok(()) } },
    Entry { keyword: "tls_listing", min: 1, max: None, parse: |c, t| { c.tls_listing = acl_of(&t)?; Ok(()) } },
    Entry { keyword: "tls_data", min: 1, max: None, parse: |c, t| { c.tls_data = acl_of(&t)?; Ok(()) } },
    Entry { keyword: "tls_fxp", min: 1, max: None, parse: |c, t| { c.tls_fxp = acl_of(&t)?; Ok(()) } },

    // single-valued composites
    Entry { keyword: "ascii_downloads", min: 1, max: None, parse: |c, t| { c.ascii_downloads = AsciiDownloads::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "ascii_uploads", min: 1, max: None, parse: |c, t| { c.ascii_uploads = AsciiUploads::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "sim_xfers", min: 2, max: Some(2), parse: |c, t| { c.sim_xfers = SimXfers::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "active_ports", min: 1, max: None, parse: |c, t| { c.active_ports = Ports::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "pasv_ports", min: 1, max: None, parse: |c, t| { c.pasv_ports = Ports::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "max_users", min: 2, max: Some(2), parse: |c, t| { c.max_users = MaxUsers::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "lslong", min: 1, max: Some(2), parse: |c, t| { c.lslong = Lslong::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "requests", min: 2, max: Some(2), parse: |c, t| { c.requests = Requests::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "lastonline", min: 1, max: Some(2), parse: |c, t| { c.lastonline = Lastonline::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "dupe_check", min: 2, max: Some(2), parse: |c, t| { c.dupe_check = Some(DupeCheck::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "nukedir_style", min: 3, max: Some(3), parse: |c, t| { c.nukedir_style = NukedirStyle::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "idle_timeout", min: 3, max: Some(3), parse: |c, t| { c.idle_timeout = IdleTimeout::from_tokens(&t)?; Ok(()) } },
    Entry { keyword: "week_start", min: 1, max: Some(1), parse: |c, t| { c.week_start = WeekStart::from_token(&t[0])?; Ok(()) } },
    Entry { keyword: "epsv_fxp", min: 1, max: Some(1), parse: |c, t| { c.epsv_fxp = EpsvFxp::from_token(&t[0])?; Ok(()) } },

    // accumulating composites
    Entry { keyword: "secure_ip", min: 4, max: None, parse: |c, t| { c.secure_ip.push(SecureIp::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "secure_pass", min: 2, max: None, parse: |c, t| { c.secure_pass.push(SecurePass::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "speed_limit", min: 4, max: None, parse: |c, t| { c.speed_limit.push(SpeedLimit::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "pasv_addr", min: 1, max: Some(2), parse: |c, t| { c.pasv_addr.push(PasvAddr::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "allow_fxp", min: 4, max: None, parse: |c, t| { c.allow_fxp.push(AllowFxp::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "welcome_msg", min: 2, max: None, parse: |c, t| { c.welcome_msg.push(AclWithPath::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "goodbye_msg", min: 2, max: None, parse: |c, t| { c.goodbye_msg.push(AclWithPath::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "newsfile", min: 2, max: None, parse: |c, t| { c.newsfile.push(AclWithPath::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "alias", min: 2, max: Some(2), parse: |c, t| { c.alias.push(Alias::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "use_dir_size", min: 2, max: None, parse: |c, t| { c.use_dir_size.push(UseDirSize::from_tokens(&t)?); Ok(()) } },

    // rights
    Entry { keyword: "delete", min: 2, max: None, parse: |c, t| { c.delete.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "deleteown", min: 2, max: None, parse: |c, t| { c.deleteown.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "overwrite", min: 2, max: None, parse: |c, t| { c.overwrite.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "resume", min: 2, max: None, parse: |c, t| { c.resume.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "rename", min: 2, max: None, parse: |c, t| { c.rename.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "renameown", min: 2, max: None, parse: |c, t| { c.renameown.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "filemove", min: 2, max: None, parse: |c, t| { c.filemove.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "makedir", min: 2, max: None, parse: |c, t| { c.makedir.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "upload", min: 2, max: None, parse: |c, t| { c.upload.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "download", min: 2, max: None, parse: |c, t| { c.download.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "nuke", min: 2, max: None, parse: |c, t| { c.nuke.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "dirlog", min: 2, max: None, parse: |c, t| { c.dirlog.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "hideinwho", min: 2, max: None, parse: |c, t| { c.hideinwho.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "freefile", min: 2, max: None, parse: |c, t| { c.freefile.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "nostats", min: 2, max: None, parse: |c, t| { c.nostats.push(Right::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "show_diz", min: 2, max: None, parse: |c, t| { c.show_diz.push(Right::from_tokens(&t)?); Ok(()) } },

    Entry { keyword: "stat_section", min: 3, max: Some(3), parse: |c, t| { c.stat_section.push(StatSection::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "path-filter", min: 3, max: None, parse: |c, t| { c.path_filter.push(PathFilter::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "max_ustats", min: 1, max: None, parse: |c, t| { c.max_ustats.push(AclInt::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "max_gstats", min: 1, max: None, parse: |c, t| { c.max_gstats.push(AclInt::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "show_totals", min: 1, max: None, parse: |c, t| { c.show_totals.push(ShowTotals::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "script", min: 2, max: None, parse: |c, t| { c.script.push(Script::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "hidden_files", min: 2, max: None, parse: |c, t| { c.hidden_files.push(HiddenFiles::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "creditcheck", min: 3, max: None, parse: |c, t| { c.creditcheck.push(Creditcheck::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "creditloss", min: 4, max: None, parse: |c, t| { c.creditloss.push(Creditloss::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "privgroup", min: 2, max: Some(2), parse: |c, t| { c.privgroup.push(Privgroup::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "msg_path", min: 2, max: None, parse: |c, t| { c.msg_path.push(Msgpath::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "privpath", min: 2, max: None, parse: |c, t| { c.privpath.push(Privpath::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "site_cmd", min: 3, max: Some(4), parse: |c, t| { c.site_cmd.push(SiteCmd::from_tokens(&t)?); Ok(()) } },
    Entry { keyword: "cscript", min: 3, max: Some(3), parse: |c, t| { c.cscript.push(Cscript::from_tokens(&t)?); Ok(()) } },
];

/// The keyword registry.
///
/// Built once from the static table; lookup is by lower-cased keyword.
/// A miss yields [`ConfigError::NoSetting`], which the loader treats as
/// recoverable.
pub struct Factory {
    entries: FxHashMap<&'static str, &'static Entry>,
}

impl Factory {
    fn new() -> Self {
        let mut entries = FxHashMap::default();
        for entry in TABLE {
            let previous = entries.insert(entry.keyword, entry);
            debug_assert!(previous.is_none(), "duplicate keyword in registry");
        }
        Self { entries }
    }

    /// The process-wide registry instance.
    #[must_use]
    pub fn global() -> &'static Self {
        static FACTORY: OnceLock<Factory> = OnceLock::new();
        FACTORY.get_or_init(Self::new)
    }

    /// Whether a keyword names a registered setting.
    #[must_use]
    pub fn is_known(&self, keyword: &str) -> bool {
        self.entries.contains_key(keyword)
    }

    /// All registered keywords, in no particular order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub(crate) fn dispatch(
        &self,
        config: &mut Config,
        keyword: &str,
        toks: Vec<String>,
    ) -> Result<(), ConfigError> {
        let Some(entry) = self.entries.get(keyword) else {
            return Err(ConfigError::NoSetting {
                keyword: keyword.to_owned(),
            });
        };
        if toks.len() < entry.min || entry.max.is_some_and(|max| toks.len() > max) {
            return Err(ConfigError::parameter_count(keyword));
        }
        (entry.parse)(config, toks)
    }
}

#[cfg(test)]
mod tests {
    use super::Factory;

    #[test]
    fn registry_covers_the_keyword_set() {
        let factory = Factory::global();
        assert!(factory.keywords().count() >= 90);
        for keyword in [
            "ascii_downloads",
            "shutdown",
            "free_space",
            "secure_ip",
            "secure_pass",
            "speed_limit",
            "allow_fxp",
            "pasv_addr",
            "active_addr",
            "active_ports",
            "pasv_ports",
            "welcome_msg",
            "goodbye_msg",
            "alias",
            "cdpath",
            "path-filter",
            "max_users",
            "banned_users",
            "cscript",
            "site_cmd",
            "idle_timeout",
            "tls_control",
            "tls_listing",
            "tls_data",
            "tls_fxp",
            "delete",
            "deleteown",
            "overwrite",
            "resume",
            "rename",
            "renameown",
            "makedir",
            "upload",
            "download",
            "nuke",
            "dirlog",
            "hideinwho",
            "freefile",
            "nostats",
            "show_diz",
        ] {
            assert!(factory.is_known(keyword), "missing keyword '{keyword}'");
        }
        assert!(!factory.is_known("no_such_setting"));
    }
}
