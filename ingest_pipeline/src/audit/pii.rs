// /////////////////////////////////////////////////////////////////////////////
// Optimized Adaptive Pipeline RS
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! PII detection: seven regex patterns scanned over every chunk,
//! aggregated into a [`PiiReport`] with per-type counts, the indices of
//! chunks carrying a hit, and a set of compliance recommendations.
//!
//! `PHONE_FR` and `PHONE_INTL` overlap on French numbers written in
//! international form (`+33 ...`), since `PHONE_INTL` can match a
//! substring of what `PHONE_FR` matches in full. Matches are deduplicated
//! by span rather than by string equality so a shorter `PHONE_INTL` match
//! nested inside a `PHONE_FR` match is recognized as the same phone number.

use ingest_domain::entities::PiiReport;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE_FR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:(?:\+|00)33\s?|0)[1-9](?:[\s.-]?\d{2}){4}\b").unwrap());
static PHONE_INTL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+\d{1,3}[\s.-]?\(?\d{1,4}\)?[\s.-]?\d{1,4}[\s.-]?\d{1,9}").unwrap());
static SSN_FR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[12]\s?\d{2}\s?\d{2}\s?\d{2}\s?\d{3}\s?\d{3}\s?\d{2}\b").unwrap());
static IBAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{2}\d{2}\s?(?:[A-Z0-9]{4}\s?){3,7}[A-Z0-9]{1,4}\b").unwrap());
static CREDIT_CARD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:\d{4}[\s-]?){3}\d{1,7}\b").unwrap());
static IP_ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").unwrap());

/// Scans every chunk's text with the seven PII patterns and aggregates the
/// results. International-phone matches already counted as a French phone
/// are excluded from `phone_intl` to avoid double counting.
pub fn detect_pii<'a>(texts: impl IntoIterator<Item = &'a str>) -> PiiReport {
    let mut pii_types: BTreeMap<String, u64> = BTreeMap::new();
    for key in ["email", "phone_fr", "phone_intl", "ssn_fr", "iban", "credit_card", "ip_address"] {
        pii_types.insert(key.to_string(), 0);
    }

    let mut chunks_with_pii = Vec::new();

    for (idx, text) in texts.into_iter().enumerate() {
        if text.is_empty() {
            continue;
        }
        let mut chunk_has_pii = false;

        let emails: Vec<&str> = EMAIL.find_iter(text).map(|m| m.as_str()).collect();
        if !emails.is_empty() {
            *pii_types.get_mut("email").unwrap() += emails.len() as u64;
            chunk_has_pii = true;
        }

        let phones_fr: Vec<std::ops::Range<usize>> = PHONE_FR.find_iter(text).map(|m| m.range()).collect();
        if !phones_fr.is_empty() {
            *pii_types.get_mut("phone_fr").unwrap() += phones_fr.len() as u64;
            chunk_has_pii = true;
        }

        let phones_intl_new = PHONE_INTL
            .find_iter(text)
            .filter(|m| !phones_fr.iter().any(|fr| fr.start <= m.start() && m.end() <= fr.end))
            .count();
        if phones_intl_new > 0 {
            *pii_types.get_mut("phone_intl").unwrap() += phones_intl_new as u64;
            chunk_has_pii = true;
        }

        let ssn: Vec<&str> = SSN_FR.find_iter(text).map(|m| m.as_str()).collect();
        if !ssn.is_empty() {
            *pii_types.get_mut("ssn_fr").unwrap() += ssn.len() as u64;
            chunk_has_pii = true;
        }

        let ibans: Vec<&str> = IBAN.find_iter(text).map(|m| m.as_str()).collect();
        if !ibans.is_empty() {
            *pii_types.get_mut("iban").unwrap() += ibans.len() as u64;
            chunk_has_pii = true;
        }

        let cards: Vec<&str> = CREDIT_CARD.find_iter(text).map(|m| m.as_str()).collect();
        if !cards.is_empty() {
            *pii_types.get_mut("credit_card").unwrap() += cards.len() as u64;
            chunk_has_pii = true;
        }

        let ips: Vec<&str> = IP_ADDRESS.find_iter(text).map(|m| m.as_str()).collect();
        if !ips.is_empty() {
            *pii_types.get_mut("ip_address").unwrap() += ips.len() as u64;
            chunk_has_pii = true;
        }

        if chunk_has_pii {
            chunks_with_pii.push(idx);
        }
    }

    let total_pii_found: u64 = pii_types.values().sum();
    let recommendations = build_recommendations(&pii_types, total_pii_found);

    if pii_types["ssn_fr"] + pii_types["credit_card"] > 0 {
        tracing::error!(
            ssn = pii_types["ssn_fr"],
            credit_card = pii_types["credit_card"],
            "critical PII detected: SSN or payment card numbers present"
        );
    }

    PiiReport {
        total_pii_found,
        pii_types,
        chunks_with_pii,
        recommendations,
    }
}

fn build_recommendations(pii_types: &BTreeMap<String, u64>, total_pii_found: u64) -> Vec<String> {
    let mut recommendations = Vec::new();
    if total_pii_found == 0 {
        recommendations.push("No personal data detected by the automated scan.".to_string());
        return recommendations;
    }

    recommendations.push("Personal data detected — review regulatory compliance.".to_string());

    let emails = pii_types["email"];
    if emails > 0 {
        recommendations.push(format!("{emails} email address(es) detected — consent required."));
    }
    let phones = pii_types["phone_fr"] + pii_types["phone_intl"];
    if phones > 0 {
        recommendations.push(format!("{phones} phone number(s) detected — data minimization required."));
    }
    let ssn = pii_types["ssn_fr"];
    if ssn > 0 {
        recommendations.push(format!("{ssn} national ID number(s) detected — CRITICAL, encryption mandatory."));
    }
    let iban = pii_types["iban"];
    if iban > 0 {
        recommendations.push(format!("{iban} IBAN(s) detected — sensitive data, reinforced security measures required."));
    }
    let cards = pii_types["credit_card"];
    if cards > 0 {
        recommendations.push(format!("{cards} payment card number(s) detected — CRITICAL, PCI DSS compliance required."));
    }
    let ips = pii_types["ip_address"];
    if ips > 0 {
        recommendations.push(format!("{ips} IP address(es) detected — pseudonymization recommended."));
    }
    recommendations.push("Required actions: notify DPO, run a DPIA, update the processing register.".to_string());
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_email_and_phone() {
        let report = detect_pii(["Contact: john@example.com, Tel: +33612345678"]);
        assert_eq!(report.pii_types["email"], 1);
        assert!(report.pii_types["phone_fr"] + report.pii_types["phone_intl"] >= 1);
        assert!(report.is_consistent());
    }

    #[test]
    fn dedupes_international_overlap_with_french_phone() {
        let report = detect_pii(["+33612345678"]);
        assert_eq!(report.pii_types["phone_fr"], 1);
        assert_eq!(report.pii_types["phone_intl"], 0);
    }

    #[test]
    fn dedupes_spaced_french_phone_nested_inside_international_match() {
        let report = detect_pii(["Contact: john@example.com, Tel: +33 6 12 34 56 78"]);
        assert_eq!(report.pii_types["email"], 1);
        assert_eq!(report.pii_types["phone_fr"], 1);
        assert_eq!(report.pii_types["phone_intl"], 0);
        assert_eq!(report.total_pii_found, 2);
        assert_eq!(report.chunks_with_pii_count(), 1);
        assert!(report.is_consistent());
    }

    #[test]
    fn no_pii_yields_clean_recommendation() {
        let report = detect_pii(["nothing sensitive here"]);
        assert_eq!(report.total_pii_found, 0);
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn records_chunk_indices_with_pii() {
        let report = detect_pii(["clean text", "email me at a@b.com"]);
        assert_eq!(report.chunks_with_pii, vec![1]);
    }
}
