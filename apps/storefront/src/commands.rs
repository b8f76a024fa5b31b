//! Subcommand implementations.

use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use grocery_client::{AppState, AuthFlow, HttpAuthBackend, StorefrontConfig};
use grocery_core::ScreenKind;

/// Wrong codes `recover` accepts before giving up; resends are not counted.
const MAX_CODE_ATTEMPTS: usize = 3;

// =============================================================================
// Cart Edits
// =============================================================================

/// One `cart` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEdit {
    Add(String),
    Remove(String),
    Set(String, i64),
}

impl FromStr for CartEdit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (op, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("expected <op>:<id>, got '{}'", s))?;

        match op {
            "add" => Ok(CartEdit::Add(rest.to_string())),
            "remove" | "rm" => Ok(CartEdit::Remove(rest.to_string())),
            "set" => {
                let (id, qty) = rest
                    .split_once('=')
                    .ok_or_else(|| format!("expected set:<id>=<qty>, got '{}'", s))?;
                let qty = qty
                    .parse::<i64>()
                    .map_err(|e| format!("bad quantity '{}': {}", qty, e))?;
                Ok(CartEdit::Set(id.to_string(), qty))
            }
            other => Err(format!("unknown cart edit '{}' (add, remove, set)", other)),
        }
    }
}

// =============================================================================
// Catalog & Cart
// =============================================================================

pub fn catalog(config: &StorefrontConfig, category: Option<&str>) -> Result<()> {
    let app = AppState::from_config(config).context("loading catalog")?;
    let products = app.products();

    let listed: Vec<_> = match category {
        Some(category) => products.in_category(category).collect(),
        None => products.iter().collect(),
    };

    for product in listed {
        let list = app.format_amount(product.price.round_to_cents());
        let price = match product.offer_price {
            Some(offer) => format!("{} (was {})", app.format_amount(offer.round_to_cents()), list),
            None => list,
        };
        let stock = if product.in_stock { "" } else { "  [out of stock]" };
        println!(
            "{:<10} {:<20} {:<12} {}{}",
            product.id, product.name, product.category, price, stock
        );
    }
    Ok(())
}

pub fn cart(config: &StorefrontConfig, edits: &[CartEdit]) -> Result<()> {
    let app = AppState::from_config(config).context("loading catalog")?;

    for edit in edits {
        let message = match edit {
            CartEdit::Add(id) => Some(app.add_to_cart(id).message()),
            CartEdit::Set(id, qty) => Some(app.update_cart_item(id, *qty).message()),
            CartEdit::Remove(id) => app.remove_from_cart(id).map(|e| e.message()),
        };
        if let Some(message) = message {
            println!("· {}", message);
        }
    }

    println!();
    for line in app.cart_lines() {
        let name = line
            .product
            .as_ref()
            .map_or("(not in catalog)", |p| p.name.as_str());
        println!(
            "{:<10} {:<20} x{:<4} {}",
            line.product_id,
            name,
            line.quantity,
            app.format_amount(line.line_total)
        );
    }
    println!("Items: {}", app.cart_count());
    println!("Total: {}", app.format_amount(app.cart_amount()));
    Ok(())
}

// =============================================================================
// Auth
// =============================================================================

fn flow_for(config: &StorefrontConfig) -> Result<AuthFlow> {
    let backend = Arc::new(HttpAuthBackend::new(&config.api)?);
    Ok(AuthFlow::from_config(backend, config))
}

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn show_status(flow: &AuthFlow) {
    if let Some(message) = flow.message() {
        println!("[{}] {}", flow.title(), message);
    }
}

/// Works the verify screen until a code is accepted.
///
/// `next_code` supplies each entry; `resend` asks for a fresh code instead.
async fn enter_code(
    flow: &mut AuthFlow,
    email: &str,
    mut next_code: impl FnMut() -> Result<String>,
) -> Result<()> {
    let mut failed = 0;
    while flow.kind() == ScreenKind::VerifyingCode {
        let entered = next_code()?;

        if entered.eq_ignore_ascii_case("resend") {
            match flow.request_code(email).await {
                Ok(()) => info!(email, "Recovery code re-sent"),
                Err(e) => warn!(email, error = %e, "Resending recovery code failed"),
            }
        } else {
            match flow.verify_code(email, &entered).await {
                Ok(()) => info!(email, "Recovery code accepted"),
                Err(e) => {
                    failed += 1;
                    warn!(email, attempt = failed, error = %e, "Recovery code rejected");
                }
            }
        }
        show_status(flow);

        if failed >= MAX_CODE_ATTEMPTS {
            bail!("too many failed code attempts");
        }
    }
    Ok(())
}

pub async fn recover(
    config: &StorefrontConfig,
    email: &str,
    code: Option<String>,
    new_password: Option<String>,
) -> Result<()> {
    let mut flow = flow_for(config)?;
    flow.forgot_password()?;

    println!("{}", flow.title());
    let sent = flow.request_code(email).await;
    show_status(&flow);
    sent?;
    info!(email, "Recovery code sent");

    let mut code = code;
    enter_code(&mut flow, email, || match code.take() {
        Some(code) => Ok(code),
        None => prompt("OTP (or 'resend')"),
    })
    .await?;

    let new_password = match new_password {
        Some(password) => password,
        None => prompt("New password")?,
    };
    let reset = flow.reset_password(email, &new_password).await;
    show_status(&flow);
    reset?;
    info!(email, "Password reset");

    Ok(())
}

pub async fn login(config: &StorefrontConfig, email: &str, password: Option<String>) -> Result<()> {
    let app = AppState::from_config(config)?;
    let mut flow = flow_for(config)?;

    let password = match password {
        Some(password) => password,
        None => prompt("Password")?,
    };

    app.open_login();
    let outcome = app.complete_login(&mut flow, email, &password).await;
    show_status(&flow);
    let user = outcome?;
    info!(email = %user.email, "Signed in");

    println!("Signed in as {} <{}>", user.name, user.email);
    Ok(())
}

// =============================================================================
// Config
// =============================================================================

pub fn config_show(config: &StorefrontConfig) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub fn config_init(path: Option<PathBuf>) -> Result<()> {
    StorefrontConfig::default()
        .save(path)
        .context("writing default configuration")?;
    println!("Default configuration written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use grocery_client::AuthBackend;
    use grocery_core::{AuthError, AuthResult, User};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Accepts exactly one code and counts sends.
    struct OneCode {
        accepted: &'static str,
        sends: AtomicUsize,
    }

    #[async_trait]
    impl AuthBackend for OneCode {
        async fn send_code(&self, _email: &str) -> AuthResult<()> {
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn verify_code(&self, _email: &str, code: &str) -> AuthResult<()> {
            if code == self.accepted {
                Ok(())
            } else {
                Err(AuthError::ServerRejected { message: None })
            }
        }

        async fn reset_password(&self, _email: &str, _new_password: &str) -> AuthResult<()> {
            Ok(())
        }

        async fn login(&self, _email: &str, _password: &str) -> AuthResult<User> {
            Ok(User::demo())
        }

        async fn register(&self, _name: &str, _email: &str, _password: &str) -> AuthResult<()> {
            Ok(())
        }
    }

    async fn verifying(backend: Arc<OneCode>) -> AuthFlow {
        let mut flow = AuthFlow::new(backend, Duration::from_secs(5), Duration::from_secs(4));
        flow.forgot_password().unwrap();
        flow.request_code("a@b.com").await.unwrap();
        flow
    }

    fn script(entries: &[&str]) -> impl FnMut() -> Result<String> {
        let mut entries: Vec<String> = entries.iter().rev().map(|e| e.to_string()).collect();
        move || entries.pop().context("no more input")
    }

    #[tokio::test]
    async fn test_resend_does_not_use_up_attempts() {
        let backend = Arc::new(OneCode {
            accepted: "333",
            sends: AtomicUsize::new(0),
        });
        let mut flow = verifying(backend.clone()).await;

        let entries = script(&["111", "resend", "resend", "222", "333"]);
        enter_code(&mut flow, "a@b.com", entries).await.unwrap();

        assert_eq!(flow.kind(), ScreenKind::ResettingPassword);
        assert_eq!(backend.sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_wrong_codes() {
        let backend = Arc::new(OneCode {
            accepted: "333",
            sends: AtomicUsize::new(0),
        });
        let mut flow = verifying(backend).await;

        let entries = script(&["1", "2", "3", "333"]);
        let err = enter_code(&mut flow, "a@b.com", entries).await.unwrap_err();

        assert!(err.to_string().contains("too many"));
        assert_eq!(flow.kind(), ScreenKind::VerifyingCode);
    }

    #[test]
    fn test_parse_cart_edits() {
        assert_eq!("add:p1".parse::<CartEdit>(), Ok(CartEdit::Add("p1".into())));
        assert_eq!("rm:p1".parse::<CartEdit>(), Ok(CartEdit::Remove("p1".into())));
        assert_eq!(
            "set:p2=-1".parse::<CartEdit>(),
            Ok(CartEdit::Set("p2".into(), -1))
        );
        assert!("set:p2".parse::<CartEdit>().is_err());
        assert!("buy:p1".parse::<CartEdit>().is_err());
        assert!("p1".parse::<CartEdit>().is_err());
    }
}
