use anyhow::{Context, Result, bail};
use bearer_auth::config::TokenConfig;
use bearer_auth::services::auth::{Claims, TokenCodec};
use clap::Parser;
use serde_json::Value;

/// Issue (or inspect) an access token signed with the API's configured secret.
///
/// Reads SECRET_KEY / ALGORITHM / ACCESS_TOKEN_EXPIRE_MINUTES from the environment
/// (or `.env`), exactly like the server does.
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Subject written to the `user_id` claim.
    #[arg(long, required_unless_present = "verify")]
    user_id: Option<i64>,

    /// Extra claim as KEY=VALUE. VALUE is parsed as JSON, falling back to a string.
    #[arg(long = "claim", value_name = "KEY=VALUE")]
    claims: Vec<String>,

    /// Validate this token instead of issuing one, and print its claims.
    #[arg(long, conflicts_with_all = ["user_id", "claims"])]
    verify: Option<String>,

    /// Print only the token (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn parse_claim(raw: &str) -> Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("claim must look like KEY=VALUE, got {raw:?}");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("claim key is empty in {raw:?}");
    }
    if key == Claims::EXP || key == Claims::USER_ID {
        bail!("{key} is set by token-gen itself");
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = TokenConfig::from_env().context("loading token configuration")?;
    let codec = TokenCodec::new(&config).context("building token codec")?;

    if let Some(token) = args.verify {
        let claims = codec.validate(&token).context("token rejected")?;
        println!("{}", serde_json::to_string_pretty(&claims)?);
        return Ok(());
    }

    let user_id = args.user_id.context("--user-id is required")?;
    let mut claims = Claims::for_user(user_id);
    for raw in &args.claims {
        let (key, value) = parse_claim(raw)?;
        claims.insert(key, value);
    }

    let token = codec.issue(&claims).context("issuing token")?;

    if args.quiet {
        println!("{}", token);
        return Ok(());
    }

    let expires_at = chrono::Utc::now() + chrono::Duration::seconds(codec.expires_in_seconds());
    println!("token: {}", token);
    println!("user_id: {}", user_id);
    println!("expires_at: {}", expires_at.format("%Y-%m-%d %H:%M:%S UTC"));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_values_are_json_when_possible() {
        assert_eq!(
            parse_claim("admin=true").unwrap(),
            ("admin".to_string(), Value::Bool(true))
        );
        assert_eq!(
            parse_claim("scope=read write").unwrap(),
            ("scope".to_string(), Value::String("read write".into()))
        );
    }

    #[test]
    fn reserved_or_malformed_claims_are_rejected() {
        assert!(parse_claim("user_id=2").is_err());
        assert!(parse_claim("exp=0").is_err());
        assert!(parse_claim("no-equals-sign").is_err());
        assert!(parse_claim("=value").is_err());
    }
}
