//! Biometric unlock
//!
//! The device prompt is an external collaborator behind [`BiometricPrompt`].

use async_trait::async_trait;

use crate::domain::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricKind {
    Fingerprint,
    FacialRecognition,
    Iris,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BiometricOutcome {
    Success,
    Cancelled,
    Failed,
    Unavailable(String),
}

#[async_trait]
pub trait BiometricPrompt: Send + Sync {
    async fn has_hardware(&self) -> bool;

    async fn is_enrolled(&self) -> bool;

    async fn supported_kinds(&self) -> Vec<BiometricKind>;

    /// Show the system prompt and wait for the user
    async fn authenticate(&self, prompt_message: &str) -> BiometricOutcome;
}

/// Hardware present and at least one biometric enrolled
pub async fn is_biometric_available(prompt: &dyn BiometricPrompt) -> bool {
    prompt.has_hardware().await && prompt.is_enrolled().await
}

/// Name of the preferred biometric method for display
pub async fn biometric_display_name(prompt: &dyn BiometricPrompt, language: Language) -> String {
    let kinds = prompt.supported_kinds().await;
    let nb = language == Language::NbNo;
    let kind = if kinds.contains(&BiometricKind::FacialRecognition) {
        Some(BiometricKind::FacialRecognition)
    } else {
        kinds.first().copied()
    };
    let name = match (kind, nb) {
        (Some(BiometricKind::FacialRecognition), true) => "Ansiktsgjenkjenning",
        (Some(BiometricKind::FacialRecognition), false) => "Face recognition",
        (Some(BiometricKind::Fingerprint), true) => "Fingeravtrykk",
        (Some(BiometricKind::Fingerprint), false) => "Fingerprint",
        (Some(BiometricKind::Iris), _) => "Iris",
        (None, true) => "Biometrisk",
        (None, false) => "Biometric",
    };
    name.to_string()
}

/// Run the prompt; `Err` carries a user-facing reason
pub async fn authenticate_with_biometrics(
    prompt: &dyn BiometricPrompt,
    language: Language,
) -> Result<(), String> {
    let nb = language == Language::NbNo;
    if !is_biometric_available(prompt).await {
        return Err(if nb {
            "Biometrisk autentisering er ikke tilgjengelig på denne enheten"
        } else {
            "Biometric authentication is not available on this device"
        }
        .to_string());
    }

    let message = if nb { "Autentiser for å logge inn" } else { "Authenticate to sign in" };
    match prompt.authenticate(message).await {
        BiometricOutcome::Success => Ok(()),
        BiometricOutcome::Cancelled => {
            Err(if nb { "Autentisering avbrutt" } else { "Authentication cancelled" }.to_string())
        }
        BiometricOutcome::Failed => {
            Err(if nb { "Autentisering feilet" } else { "Authentication failed" }.to_string())
        }
        BiometricOutcome::Unavailable(reason) => {
            log::warn!("biometric prompt unavailable: {}", reason);
            Err(if nb {
                "En feil oppstod under autentisering"
            } else {
                "An error occurred during authentication"
            }
            .to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted prompt for tests
    struct FakePrompt {
        hardware: bool,
        enrolled: bool,
        kinds: Vec<BiometricKind>,
        outcome: BiometricOutcome,
    }

    #[async_trait]
    impl BiometricPrompt for FakePrompt {
        async fn has_hardware(&self) -> bool {
            self.hardware
        }
        async fn is_enrolled(&self) -> bool {
            self.enrolled
        }
        async fn supported_kinds(&self) -> Vec<BiometricKind> {
            self.kinds.clone()
        }
        async fn authenticate(&self, _prompt_message: &str) -> BiometricOutcome {
            self.outcome.clone()
        }
    }

    fn prompt(outcome: BiometricOutcome) -> FakePrompt {
        FakePrompt {
            hardware: true,
            enrolled: true,
            kinds: vec![BiometricKind::Fingerprint],
            outcome,
        }
    }

    #[tokio::test]
    async fn test_authenticate_outcomes() {
        let ok = prompt(BiometricOutcome::Success);
        assert!(authenticate_with_biometrics(&ok, Language::EnUs).await.is_ok());

        let cancelled = prompt(BiometricOutcome::Cancelled);
        assert_eq!(
            authenticate_with_biometrics(&cancelled, Language::NbNo).await,
            Err("Autentisering avbrutt".to_string())
        );

        let mut missing = prompt(BiometricOutcome::Success);
        missing.enrolled = false;
        assert!(authenticate_with_biometrics(&missing, Language::EnUs).await.is_err());
    }

    #[tokio::test]
    async fn test_display_name_prefers_face() {
        let mut p = prompt(BiometricOutcome::Success);
        assert_eq!(biometric_display_name(&p, Language::EnUs).await, "Fingerprint");

        p.kinds = vec![BiometricKind::Fingerprint, BiometricKind::FacialRecognition];
        assert_eq!(biometric_display_name(&p, Language::NbNo).await, "Ansiktsgjenkjenning");

        p.kinds.clear();
        assert_eq!(biometric_display_name(&p, Language::EnUs).await, "Biometric");
    }
}
