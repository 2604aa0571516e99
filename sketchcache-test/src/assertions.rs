//! Custom assertions for testing

use sketchcache_index::DeviceIndex;

/// Assert that two indices hold the same arrays and answer every
/// representation query identically
pub fn assert_same_index(actual: &DeviceIndex, expected: &DeviceIndex) {
    assert_eq!(
        actual.descriptor(),
        expected.descriptor(),
        "Indices cover different reads"
    );
    assert_eq!(actual.kmer_size(), expected.kmer_size());
    assert_eq!(actual.window_size(), expected.window_size());
    assert_eq!(
        actual.number_of_sketch_elements(),
        expected.number_of_sketch_elements(),
        "Sketch sizes differ for {}",
        expected.descriptor()
    );

    for &representation in expected.unique_representations() {
        assert_eq!(
            actual.sketch_elements(representation),
            expected.sketch_elements(representation),
            "Occurrences of {:#x} differ",
            representation
        );
    }
    assert_eq!(actual.contents(), expected.contents());
}

/// Assert that a FASTA content is valid
pub fn assert_valid_fasta(content: &str) {
    let lines: Vec<&str> = content.lines().collect();
    assert!(!lines.is_empty(), "FASTA content is empty");
    assert!(
        lines[0].starts_with('>'),
        "FASTA content must start with a header"
    );

    for line in lines {
        if let Some(header) = line.strip_prefix('>') {
            assert!(!header.trim().is_empty(), "Empty FASTA header found");
        } else {
            assert!(
                line.bytes().all(|b| b.is_ascii_alphabetic()),
                "Invalid sequence line: {}",
                line
            );
        }
    }
}
