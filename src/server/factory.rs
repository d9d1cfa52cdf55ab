use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use openssl::ssl::{SslAcceptor, SslAcceptorBuilder, SslMethod};

use super::authn::factory::AuthnFactory;
use super::authn::token::factory::TokenFactory;
use super::authz::factory::AuthzFactory;
use super::config::ServerConfig;
use super::db::factory::DbFactory;
use super::db::Database;
use super::handlers::api::ApiHandler;
use super::handlers::auth::AuthHandler;
use super::handlers::healthz::HealthzHandler;
use super::restful::{RestfulContext, RestfulServer};

pub struct ServerFactory {
    db: Arc<Database>,
    cfg: ServerConfig,
}

impl ServerFactory {
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let db_factory = DbFactory::new();
        let db = db_factory.build_db(&cfg.db).context("init database")?;

        if !cfg.authn.admin_password.is_empty() {
            AuthHandler::ensure_admin(&db, &cfg.authn.admin_password)
                .context("bootstrap admin account")?;
        } else {
            info!("No admin password configured, skip admin bootstrap");
        }

        Ok(Self { cfg, db })
    }

    pub fn build_server(&self) -> Result<RestfulServer> {
        let ssl = self.build_ssl()?;
        let ctx = self.build_context()?;

        let mut srv =
            RestfulServer::new(self.cfg.bind.clone(), ssl, ctx, self.cfg.payload_limit_mib);
        if self.cfg.keep_alive_secs > 0 {
            srv.set_keep_alive_secs(self.cfg.keep_alive_secs);
        }
        if self.cfg.workers > 0 {
            srv.set_workers(self.cfg.workers);
        }

        Ok(srv)
    }

    fn build_ssl(&self) -> Result<Option<SslAcceptorBuilder>> {
        if !self.cfg.ssl {
            return Ok(None);
        }

        let mut builder =
            SslAcceptor::mozilla_intermediate(SslMethod::tls()).context("init ssl acceptor")?;

        builder
            .set_private_key_file(&self.cfg.key_path, openssl::ssl::SslFiletype::PEM)
            .context("load ssl key file")?;
        builder
            .set_certificate_chain_file(&self.cfg.cert_path)
            .context("load ssl cert file")?;

        Ok(Some(builder))
    }

    fn build_context(&self) -> Result<Arc<RestfulContext>> {
        let token_factory = TokenFactory::new(&self.cfg.authn.token).context("init token")?;
        build_context(&self.cfg, &token_factory, self.db.clone())
    }
}

pub fn build_context(
    cfg: &ServerConfig,
    token_factory: &TokenFactory,
    db: Arc<Database>,
) -> Result<Arc<RestfulContext>> {
    let authn_factory = AuthnFactory::new();
    let authn = authn_factory
        .build_authenticator(&cfg.authn, token_factory, db.clone())
        .context("init authenticator")?;

    let authz_factory = AuthzFactory::new();
    let authz = authz_factory.build_authorizer(&cfg.authz);

    let token_generator = token_factory
        .build_token_generator()
        .context("init token generator")?;

    let ctx = RestfulContext {
        api_handler: ApiHandler::new(authn, authz, db.clone()),
        auth_handler: AuthHandler::new(cfg.authn.allow_signup, token_generator, db),
        healthz_handler: HealthzHandler::new(),
    };
    Ok(Arc::new(ctx))
}
