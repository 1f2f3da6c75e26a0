pub mod analyze;
pub mod encode;
pub mod keypoints;

/// Print identities ten per line between rules.
pub fn print_identities(ids: &[u64]) {
    println!("Available tracking ids:");
    println!("{}", "-".repeat(50));
    for line in format_identity_lines(ids) {
        println!("{line}");
    }
    println!("{}", "-".repeat(50));
}

fn format_identity_lines(ids: &[u64]) -> Vec<String> {
    ids.chunks(10)
        .map(|chunk| {
            chunk
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identities_wrap_every_ten() {
        let ids: Vec<u64> = (1..=12).collect();
        assert_eq!(
            format_identity_lines(&ids),
            vec!["1 2 3 4 5 6 7 8 9 10".to_string(), "11 12".to_string()]
        );
        assert!(format_identity_lines(&[]).is_empty());
    }
}
