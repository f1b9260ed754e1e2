use anyhow::{Context, Result, bail};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, user_id: i64) -> Result<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(user_id.to_string().as_bytes());
    Ok(mac)
}

/// State round-tripped through the Zoom consent screen: `{user_id}.{hex hmac}`.
pub fn sign_install_state(secret: &str, user_id: i64) -> Result<String> {
    let signature = hex::encode(mac_for(secret, user_id)?.finalize().into_bytes());
    Ok(format!("{user_id}.{signature}"))
}

pub fn verify_install_state(secret: &str, state: &str) -> Result<i64> {
    let (user_id, signature) = state
        .split_once('.')
        .context("install state is missing its signature")?;
    let user_id: i64 = user_id.parse().context("install state has no user id")?;
    let signature = hex::decode(signature).context("install state signature is not hex")?;

    if mac_for(secret, user_id)?.verify_slice(&signature).is_err() {
        bail!("install state signature mismatch");
    }
    Ok(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_state_verifies_to_the_same_user() {
        let state = sign_install_state("s3cret", 42).unwrap();

        assert!(state.starts_with("42."));
        assert_eq!(verify_install_state("s3cret", &state).unwrap(), 42);
    }

    #[test]
    fn swapped_user_id_is_rejected() {
        let state = sign_install_state("s3cret", 42).unwrap();
        let forged = state.replacen("42.", "43.", 1);

        assert!(verify_install_state("s3cret", &forged).is_err());
        assert!(verify_install_state("other", &state).is_err());
        assert!(verify_install_state("s3cret", "42").is_err());
    }
}
