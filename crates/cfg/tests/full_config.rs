//! Whole-file loader test exercising a representative glftpd-style
//! config with most grammar families present.

use std::io::Write;
use std::path::Path;

use acl::AuthContext;
use cfg::setting::{NukedirAction, SiteCmdKind};
use cfg::{Config, ConfigError};
use tempfile::NamedTempFile;

const FULL: &str = r#"
# ebftpd example configuration
sitepath /site
datapath /data
pidfile /var/run/ebftpd.pid
port 2121
tls_certificate /etc/ebftpd/ebftpd.pem

sitename_long MYSITE
sitename_short MS
email staff@mysite.example
login_prompt Welcome[:space:]to[:space:]MYSITE

valid_ip *@127.0.0.1 *@10.0.0.*
active_ports 5000-5100
pasv_ports 6000-6100 6200

max_users 100 10
sim_xfers 2 2
idle_timeout 600 10 3600

free_space 512M
empty_nuke 100M

ascii_downloads 200 *.txt *.nfo *.diz
allow_fxp no no yes @staff
welcome_msg /ftp-data/text/welcome.msg *
goodbye_msg /ftp-data/text/goodbye.msg *

alias rules /site/info/rules
cdpath /site/incoming
path-filter /ftp-data/misc/badname ^[A-Za-z0-9._-]+$ *

speed_limit /site/incoming/* 2000 1000 !@leech *
speed_limit /site/archive/* 500 0 *

upload /site/incoming/* !@banned *
download /site/* *
delete /site/* @staff 1
deleteown /site/incoming/* *
makedir /site/incoming/* *
nuke /site/* @staff
freefile /site/requests/* *
nostats /site/requests/* *
show_diz file_id.diz *

nukedir_style NUKED-%N keep 1M
lastonline all_with_activity 20
dupe_check 14 yes

site_cmd wipe EXEC /scripts/wipe Wipe[:space:]a[:space:]release
site_cmd rules TEXT /ftp-data/text/rules
cscript stor post /scripts/zipscript

section mp3
path /site/mp3/*
ratio 3
endsection

-retr !@leech *
-site *
custom-wipe @staff 1

tls_control *
tls_data !*
shutdown @staff
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write config");
    file.flush().expect("flush");
    file
}

#[test]
fn full_config_loads() {
    let file = write_config(FULL);
    let config = Config::load(file.path()).expect("load succeeds");

    assert_eq!(config.sitepath(), Path::new("/site"));
    assert_eq!(config.port(), 2121);
    assert_eq!(config.sitename_long(), "MYSITE");
    assert_eq!(config.login_prompt(), "Welcome to MYSITE");
    assert_eq!(config.valid_ip().len(), 2);
    assert_eq!(config.free_space(), 512 * 1024);
    assert_eq!(config.empty_nuke(), 100 * 1024);

    assert_eq!(config.active_ports().ranges().len(), 1);
    assert_eq!(config.pasv_ports().ranges().len(), 2);
    assert_eq!(config.max_users().users(), 100);
    assert_eq!(config.sim_xfers().max_uploads(), 2);

    assert_eq!(config.speed_limit().len(), 2);
    assert_eq!(config.upload().len(), 1);
    assert_eq!(config.site_cmd().len(), 2);
    assert_eq!(config.site_cmd()[0].command(), "WIPE");
    assert_eq!(config.site_cmd()[0].kind(), SiteCmdKind::Exec);
    assert_eq!(config.site_cmd()[0].description(), Some("Wipe a release"));
    assert_eq!(config.nukedir_style().action(), NukedirAction::Keep);
    assert_eq!(config.cscript().len(), 1);
}

#[test]
fn authorization_flows_through_the_snapshot() {
    let file = write_config(FULL);
    let config = Config::load(file.path()).expect("load succeeds");

    let staff = AuthContext::new("op", "staff", "1");
    let leech = AuthContext::new("dl", "leech", "");
    let user = AuthContext::new("joe", "users", "3");

    // command ACLs
    let retr = config.command_acl("retr").expect("retr acl");
    assert!(!retr.evaluate(&leech));
    assert!(retr.evaluate(&user));
    assert!(config.command_acl("site").expect("site acl").evaluate(&user));
    let wipe = config.command_acl("custom-wipe").expect("custom acl");
    assert!(wipe.evaluate(&staff));
    assert!(!wipe.evaluate(&user));

    // rights: first matching mask decides
    let upload = &config.upload()[0];
    assert!(upload.matches("/site/incoming/release"));
    assert!(upload.acl().evaluate(&user));

    // TLS enforcement defaults and overrides
    assert!(config.tls_control().evaluate(&user));
    assert!(!config.tls_data().evaluate(&user));
    assert!(config.shutdown().evaluate(&staff));
    assert!(!config.shutdown().evaluate(&user));

    // speed limits scoped by path and ACL
    let binding = config.download_limits_for("/site/incoming/x", &user);
    assert_eq!(binding.len(), 1);
    assert_eq!(binding[0].dl_limit(), 2000);
    assert!(config.download_limits_for("/site/incoming/x", &leech).is_empty());
    assert_eq!(config.upload_limits_for("/site/incoming/x", &user).len(), 1);

    // sections
    assert_eq!(config.section_match("/site/mp3/a").unwrap().name(), "MP3");
}

#[test]
fn snapshot_slot_swaps_wholesale() {
    let file = write_config(FULL);
    let first = Config::load(file.path()).expect("first load");
    cfg::install(first.clone());
    let installed = cfg::current().expect("installed snapshot");
    assert_eq!(installed.version(), first.version());

    let second = Config::load(file.path()).expect("second load");
    let replaced = cfg::install(second.clone()).expect("previous snapshot");
    // the old snapshot stays valid for in-flight holders
    assert_eq!(replaced.version(), first.version());
    assert_eq!(replaced.port(), 2121);
    assert!(cfg::current().expect("current").version() > replaced.version());
}

#[test]
fn malformed_lines_are_fatal_with_position() {
    let file = write_config("sitepath /site\ndatapath /data\nport 2121\nvalid_ip *\nidle_timeout 900 7200 1\n");
    let err = Config::load(file.path()).expect_err("must fail");
    assert_eq!(err.line(), Some(5));
    assert!(err.to_string().contains("idle_timeout"));
    assert!(!matches!(err, ConfigError::NoSetting { .. }));
}
