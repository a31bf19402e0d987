pub mod exoplanets;
pub mod insights;
pub mod neo;

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_structure() {
        assert_eq!(super::exoplanets::GET_EXOPLANETS, "/api/exoplanets");
        assert_eq!(super::neo::GET_NEOS, "/api/neo");
        assert_eq!(super::insights::GET_INSIGHTS, "/api/insights");
    }
}
