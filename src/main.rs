use anyhow::Result;
use clap::{Arg, Command};

use spindle::commands;

fn main() -> Result<()> {
    spindle::init_logging();

    let matches = Command::new("spindle")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Queue spotdl download jobs and promote staged downloads into your music library")
        .subcommand(
            Command::new("download")
                .about("Download one or more queries through spotdl, in order")
                .arg(
                    Arg::new("query")
                        .help("Spotify URL, search term, or bulk query (e.g. saved)")
                        .required(true)
                        .num_args(1..)
                        .index(1)
                )
                .arg(
                    Arg::new("type")
                        .short('t')
                        .long("type")
                        .value_name("TYPE")
                        .help("Request type: song, album, playlist, artist, search, youtube-match, saved, all-user-playlists, all-saved-playlists, all-user-followed-artists, all-user-saved-albums")
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Audio format (overrides the configured format)")
                )
                .arg(
                    Arg::new("bitrate")
                        .short('b')
                        .long("bitrate")
                        .value_name("BITRATE")
                        .help("Target bitrate; 'auto' omits the flag")
                )
                .arg(
                    Arg::new("cookie-file")
                        .long("cookie-file")
                        .value_name("PATH")
                        .help("Cookie file for premium sources (deleted after the job)")
                )
                .arg(
                    Arg::new("premium")
                        .long("premium")
                        .help("Authenticate against the premium source with the cookie file")
                        .action(clap::ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("save")
                .about("Resolve a query and save its metadata to a file for later syncing")
                .arg(
                    Arg::new("query")
                        .help("Spotify URL or search term")
                        .required(true)
                        .index(1)
                )
                .arg(
                    Arg::new("save-file")
                        .long("save-file")
                        .value_name("PATH")
                        .help("Metadata file to write")
                        .required(true)
                )
        )
        .subcommand(
            Command::new("sync")
                .about("Bring downloads up to date with a previously saved file")
                .arg(
                    Arg::new("save-file")
                        .long("save-file")
                        .value_name("PATH")
                        .help("Metadata file produced by save")
                        .required(true)
                )
        )
        .subcommand(
            Command::new("meta")
                .about("Fetch and apply metadata for a query")
                .arg(
                    Arg::new("query")
                        .help("Spotify URL or search term")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("url")
                .about("Print the source URLs spotdl resolves for a query")
                .arg(
                    Arg::new("query")
                        .help("Spotify URL or search term")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("list")
                .about("List the staging or library file tree")
                .arg(
                    Arg::new("root")
                        .short('r')
                        .long("root")
                        .value_name("ROOT")
                        .value_parser(["staging", "library"])
                        .default_value("staging")
                        .help("Which root to list")
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Emit the tree as JSON")
                        .action(clap::ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("promote")
                .about("Move a staged file or directory into the music library")
                .arg(
                    Arg::new("path")
                        .help("Path under the staging root to promote")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("remove")
                .about("Delete a staged file or directory")
                .arg(
                    Arg::new("path")
                        .help("Path under the staging root to delete")
                        .required(true)
                        .index(1)
                )
        )
        .subcommand(
            Command::new("config")
                .about("Read or write configuration values")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("get")
                        .about("Show a config value (or the whole config)")
                        .arg(Arg::new("key").help("Config key").index(1))
                )
                .subcommand(
                    Command::new("set")
                        .about("Set a config value")
                        .arg(Arg::new("key").help("Config key").required(true).index(1))
                        .arg(Arg::new("value").help("New value").required(true).index(2))
                )
        )
        .get_matches();

    match matches.subcommand() {
        Some(("download", sub_matches)) => commands::download(sub_matches)?,
        Some(("save", sub_matches)) => commands::tool::save(sub_matches)?,
        Some(("sync", sub_matches)) => commands::tool::sync(sub_matches)?,
        Some(("meta", sub_matches)) => commands::tool::meta(sub_matches)?,
        Some(("url", sub_matches)) => commands::tool::url(sub_matches)?,
        Some(("list", sub_matches)) => commands::list(sub_matches)?,
        Some(("promote", sub_matches)) => commands::promote(sub_matches)?,
        Some(("remove", sub_matches)) => commands::remove(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        _ => {
            println!("Welcome to spindle!");
            println!("Use 'spindle --help' for more information.");
        }
    }

    Ok(())
}
