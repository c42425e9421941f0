mod config;
mod handlers;
mod http;
mod store;

use crate::config::{Args, Limits};
use crate::http::request::Request;
use crate::store::FileStore;
use clap::Parser;
use http::method::Method;
use http::server::Server;
use log::info;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let limits = args.limits();
    let store = Arc::new(FileStore::new(&args.directory));

    let mut server = Server::from_tcp_addr((args.address, args.port), limits)?
        .with_timeout(args.read_timeout());
    register_routes(&mut server, store, limits);

    info!(
        "listening on {}, storing files in {}",
        server.local_addr()?,
        args.directory.display()
    );
    server.run()
}

/// Order matters: `/files` has to be tried before the more general `/file`.
fn register_routes(server: &mut Server, store: Arc<FileStore>, limits: Limits) {
    let store_clone = Arc::clone(&store);
    server.add_handler(
        Method::Post,
        "/upload",
        Box::new(move |r: &Request| handlers::upload_file(r, &store_clone, &limits)),
    );

    let store_clone = Arc::clone(&store);
    server.add_handler(
        Method::Get,
        "/files",
        Box::new(move |_: &Request| handlers::list_files(&store_clone)),
    );

    server.add_handler(
        Method::Get,
        "/file",
        Box::new(move |r: &Request| handlers::get_file(r, &store)),
    );
}
