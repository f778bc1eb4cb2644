use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use log::{error, info};
use nz_connector::{
    new_backend, Backend, BackupLayout, Config, Credentials, Download, Error, LogReport, Report,
    Upload,
};

const UPLOAD_COMMAND: &str = "upload";
const DOWNLOAD_COMMAND: &str = "download";
const DB_ARG: &str = "db";
const NPSHOST_ARG: &str = "npshost";
const BACKUPSET_ARG: &str = "backupset";
const INCREMENT_ARG: &str = "increment";
const UNIQUEID_ARG: &str = "uniqueid";
const PARALLEL_JOBS_ARG: &str = "paralleljobs";
const REMOTE_ARG: &str = "remote";
const CREDENTIALS_ARG: &str = "credentials";
const DIRECTORY_ARG: &str = "directory";
const CLOUD_BACKUP_ARG: &str = "cloud-backup";
const VERBOSE_ARG: &str = "verbose";

fn new_config(args: &ArgMatches<'_>, sub: &ArgMatches<'_>) -> Result<Config, Error> {
    let layout = BackupLayout::new(
        args.value_of(NPSHOST_ARG).unwrap_or_default(),
        args.value_of(DB_ARG).unwrap_or_default(),
        args.value_of(BACKUPSET_ARG).unwrap_or_default(),
        args.value_of(INCREMENT_ARG).map(String::from),
    );

    let dirs = sub
        .values_of(DIRECTORY_ARG)
        .map(|it| it.map(PathBuf::from).collect())
        .unwrap_or_else(Vec::new);

    let transfer_id = args.value_of(UNIQUEID_ARG).unwrap_or_default();

    let mut cfg = Config::new(layout, transfer_id, dirs);

    if let Some(jobs) = args.value_of(PARALLEL_JOBS_ARG) {
        cfg.parallel_jobs(jobs.parse().map_err(Error::config)?);
    }

    cfg.verbose(args.is_present(VERBOSE_ARG));

    Ok(cfg)
}

fn new_remote(args: &ArgMatches<'_>) -> Result<Arc<dyn Backend>, Error> {
    let remote = args
        .value_of(REMOTE_ARG)
        .ok_or_else(|| Error::config("missing --remote <uri>"))?;

    let credentials = match args.value_of(CREDENTIALS_ARG) {
        Some(path) => Some(Credentials::load(path)?),
        None => None,
    };

    new_backend(remote, credentials)
}

fn log_settings(cfg: &Config) {
    info!("Backup/Restore directory : {:?}", cfg.dirs);
    info!("DB name : {}", cfg.layout.db_name);
    info!("Nps hostname : {}", cfg.layout.nps_host);

    if cfg.layout.backup_set.is_empty() {
        info!("BackupsetID : ALL");
    } else {
        info!("BackupsetID : {}", cfg.layout.backup_set);
    }

    info!("UniqueID : {}", cfg.transfer_id);
    info!(
        "Number of files to upload/download in parallel : {}",
        cfg.parallel_jobs
    );
}

fn run(args: &ArgMatches<'_>) -> Result<(), Error> {
    let filter = if args.is_present(VERBOSE_ARG) {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let report: Arc<dyn Report> = Arc::new(LogReport::default());

    if let Some(sub) = args.subcommand_matches(UPLOAD_COMMAND) {
        let cfg = new_config(&args, &sub)?;
        log_settings(&cfg);

        let backend = new_remote(&args)?;
        let upload = Upload::new(&cfg, backend, report);

        upload.run()?;
        info!("Upload successful");
        return Ok(());
    }

    if let Some(sub) = args.subcommand_matches(DOWNLOAD_COMMAND) {
        let mut cfg = new_config(&args, &sub)?;
        cfg.cloud_backup(sub.is_present(CLOUD_BACKUP_ARG));
        log_settings(&cfg);

        let backend = new_remote(&args)?;
        let download = Download::new(&cfg, backend, report);

        download.run()?;
        info!("Download successful");
        return Ok(());
    }

    Ok(())
}

fn main() {
    let upload = SubCommand::with_name(UPLOAD_COMMAND)
        .about("Upload backup directories to the remote object store")
        .arg(
            Arg::with_name(DIRECTORY_ARG)
                .required(true)
                .min_values(1)
                .help("Directories in which the backup already exists"),
        );

    let download = SubCommand::with_name(DOWNLOAD_COMMAND)
        .about("Download a backup set from the remote object store")
        .arg(
            Arg::with_name(CLOUD_BACKUP_ARG)
                .long("cloud-backup")
                .help("Restore a backup originally taken to the cloud (rewrites restore manifests)"),
        )
        .arg(
            Arg::with_name(DIRECTORY_ARG)
                .required(true)
                .min_values(1)
                .help("Directories into which the backup should be downloaded"),
        );

    let app = App::new("Netezza backup cloud connector")
        .bin_name("nz-connector")
        .version("0.1")
        .setting(AppSettings::ColorAuto)
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .setting(AppSettings::StrictUtf8)
        .arg(
            Arg::with_name(REMOTE_ARG)
                .long("remote")
                .short("r")
                .value_name("uri")
                .help("Remote object store, e.g. 's3://bucket?region=eu-west-1'")
                .global(true),
        )
        .arg(
            Arg::with_name(CREDENTIALS_ARG)
                .long("credentials")
                .value_name("file")
                .env("NZ_CONNECTOR_CREDENTIALS")
                .help("JSON file with static access keys for the object store")
                .global(true),
        )
        .arg(
            Arg::with_name(DB_ARG)
                .long("db")
                .value_name("name")
                .help("Database name")
                .global(true),
        )
        .arg(
            Arg::with_name(NPSHOST_ARG)
                .long("npshost")
                .value_name("host")
                .help("Name of the NPS host as it appears in the backups")
                .global(true),
        )
        .arg(
            Arg::with_name(BACKUPSET_ARG)
                .long("backupset")
                .value_name("id")
                .help("Backupset to be uploaded/downloaded (default: all)")
                .global(true),
        )
        .arg(
            Arg::with_name(INCREMENT_ARG)
                .long("increment")
                .value_name("n")
                .help("Increment within the backupset")
                .global(true),
        )
        .arg(
            Arg::with_name(UNIQUEID_ARG)
                .long("uniqueid")
                .value_name("id")
                .help("Unique ID associated with the file transfer")
                .global(true),
        )
        .arg(
            Arg::with_name(PARALLEL_JOBS_ARG)
                .long("paralleljobs")
                .value_name("n")
                .help("Number of files to upload/download in parallel (default 6)")
                .global(true),
        )
        .arg(
            Arg::with_name(VERBOSE_ARG)
                .long("verbose")
                .short("v")
                .help("Enable debug output")
                .global(true),
        )
        .subcommand(upload)
        .subcommand(download)
        .get_matches();

    if let Err(err) = run(&app) {
        error!("{}", err);
        process::exit(1);
    }
}
