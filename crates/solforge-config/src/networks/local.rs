use super::NetworkProfile;

/// Node running on the developer's machine
pub fn localhost_profile() -> NetworkProfile {
    NetworkProfile::new("localhost", "http://127.0.0.1:8545")
}

/// Instrumented node used while collecting test coverage
pub fn coverage_profile() -> NetworkProfile {
    NetworkProfile::new("coverage", "http://localhost:8555")
}
