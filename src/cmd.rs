use std::path::PathBuf;

use getopts::Options;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Send { addr: String, path: PathBuf },
    Recv { dir: PathBuf, listen: String },
    Help(String),
}

fn build_options() -> Options {
    let mut opts = Options::new();
    opts.optopt("a", "addr", "server address (ex: 0.0.0.0:8080)", "ADDR");
    opts.optopt("d", "dir", "destination path for received files", "DIR");
    opts.optflag("h", "help", "print this help menu");
    opts
}

fn usage(program: &str, opts: &Options) -> String {
    let brief = format!(
        "Usage:\n    {0} send -a ADDR FILE\n    {0} recv [-d DIR] ADDR\n\n\
         Example:\n    {0} recv -d ./inbox 0.0.0.0:8080\n    {0} send -a 127.0.0.1:8080 myfile.txt",
        program
    );
    opts.usage(&brief)
}

pub fn parse_args(argv: Vec<String>) -> Result<Command, String> {
    let opts = build_options();
    let program = argv.first().cloned().unwrap_or_else(|| "tcpft".to_string());

    let direction = match argv.get(1) {
        Some(d) => d.as_str(),
        None => return Err(format!("missing direction, expected send or recv\n\n{}", usage(&program, &opts))),
    };
    if direction == "-h" || direction == "--help" {
        return Ok(Command::Help(usage(&program, &opts)));
    }

    let matches = match opts.parse(&argv[2..]) {
        Ok(m) => m,
        Err(f) => return Err(f.to_string()),
    };
    if matches.opt_present("h") {
        return Ok(Command::Help(usage(&program, &opts)));
    }

    match direction {
        "send" => {
            let path = match matches.free.first() {
                Some(p) => PathBuf::from(p),
                None => return Err("File name required.".to_string()),
            };
            let addr = match matches.opt_str("a") {
                Some(a) if !a.is_empty() => a,
                _ => return Err("Server address required.".to_string()),
            };
            Ok(Command::Send { addr, path })
        }
        "recv" => {
            let listen = match matches.free.first() {
                Some(a) => a.clone(),
                None => return Err("Listen address required.".to_string()),
            };
            let dir = PathBuf::from(matches.opt_str("d").unwrap_or_else(|| ".".to_string()));
            Ok(Command::Recv { dir, listen })
        }
        other => Err(format!("unknown direction {:?}, expected send or recv", other)),
    }
}
