//! Regions of the AWS partitions that offer EKS.

/// Partition used when none is requested.
pub const DEFAULT_PARTITION: &str = "aws";

const PARTITIONS: &[(&str, &[&str])] = &[
    (
        "aws",
        &[
            "us-east-1",
            "us-east-2",
            "us-west-1",
            "us-west-2",
            "af-south-1",
            "ap-east-1",
            "ap-south-1",
            "ap-south-2",
            "ap-southeast-1",
            "ap-southeast-2",
            "ap-southeast-3",
            "ap-southeast-4",
            "ap-southeast-5",
            "ap-southeast-7",
            "ap-northeast-1",
            "ap-northeast-2",
            "ap-northeast-3",
            "ca-central-1",
            "ca-west-1",
            "eu-central-1",
            "eu-central-2",
            "eu-west-1",
            "eu-west-2",
            "eu-west-3",
            "eu-north-1",
            "eu-south-1",
            "eu-south-2",
            "il-central-1",
            "me-south-1",
            "me-central-1",
            "sa-east-1",
            "mx-central-1",
        ],
    ),
    ("aws-cn", &["cn-north-1", "cn-northwest-1"]),
    ("aws-us-gov", &["us-gov-east-1", "us-gov-west-1"]),
    ("aws-iso", &["us-iso-east-1", "us-iso-west-1"]),
    ("aws-iso-b", &["us-isob-east-1"]),
];

/// Names of every known partition.
#[must_use]
pub fn partition_names() -> Vec<&'static str> {
    PARTITIONS.iter().map(|(name, _)| *name).collect()
}

/// Regions of one partition, `None` for an unknown partition.
#[must_use]
pub fn partition_regions(partition: &str) -> Option<&'static [&'static str]> {
    PARTITIONS
        .iter()
        .find(|(name, _)| *name == partition)
        .map(|(_, regions)| *regions)
}

/// Every region of the requested partitions, in table order, skipping
/// duplicates. Unknown partitions contribute nothing.
#[must_use]
pub fn regions_for_partitions<S: AsRef<str>>(partitions: &[S]) -> Vec<String> {
    let mut regions: Vec<String> = Vec::new();
    for partition in partitions {
        for region in partition_regions(partition.as_ref()).unwrap_or_default() {
            if !regions.iter().any(|r| r == region) {
                regions.push((*region).to_string());
            }
        }
    }
    regions
}
