//! Text rendering of solutions and parsing of route sequence lines.
//!
//! A solution document is four header lines (total cost rounded to the
//! nearest integer, route count, required service count twice) followed by
//! one `summary sequence` line per route:
//!
//! ```text
//! 12
//! 2
//! 3
//! 3
//! 0 1 1 8 6 2 (D 0,1,1) (S 1,2,2) (S 2,3,3) (D 0,1,1)
//! 0 1 2 4 6 1 (D 0,1,2) (S 3,4,4) (D 0,1,2)
//! ```

use crate::error::{Result, RoutingError};
use crate::models::{Route, ServiceId, Solution};

/// Summary and sequence text of one route, joined by a space.
pub fn route_line(route: &Route) -> String {
    let (summary, sequence) = route.to_output_format();
    format!("{summary} {sequence}")
}

/// One line per route, in route order.
pub fn route_lines(solution: &Solution) -> Vec<String> {
    solution.routes().iter().map(route_line).collect()
}

/// Renders a full solution document.
///
/// # Examples
///
/// ```
/// use u_arc_routing::distance::Graph;
/// use u_arc_routing::models::{ArcRoutingProblem, ServiceCatalog};
/// use u_arc_routing::constructive::path_scanning;
/// use u_arc_routing::output::render_solution;
///
/// let mut graph = Graph::new(2);
/// graph.add_edge(1, 2, 1.5).unwrap();
/// let mut catalog = ServiceCatalog::new();
/// catalog.register_edge(1, 2, 3, 1.0).unwrap();
/// let problem = ArcRoutingProblem::from_graph(&graph, catalog, 1, 5).unwrap();
///
/// let solution = path_scanning(&problem).unwrap();
/// let text = render_solution(&solution, problem.required_count());
/// assert_eq!(text, "3\n1\n1\n1\n0 1 1 3 2.5 1 (D 0,1,1) (S 1,1,2) (D 0,1,1)\n");
/// ```
pub fn render_solution(solution: &Solution, required_count: usize) -> String {
    let mut text = format!(
        "{}\n{}\n{}\n{}\n",
        solution.total_cost().round() as i64,
        solution.num_routes(),
        required_count,
        required_count
    );
    for line in route_lines(solution) {
        text.push_str(&line);
        text.push('\n');
    }
    text
}

/// Extracts the serviced ids of a route line, in travel order.
///
/// Accepts either a bare sequence or a full `summary sequence` line; the
/// summary numbers before the first token are ignored. Depot tokens must
/// carry three fields and service tokens must start with a numeric id.
///
/// # Errors
///
/// [`RoutingError::MalformedToken`] when a parenthesised token cannot be read.
pub fn parse_sequence(line: &str) -> Result<Vec<ServiceId>> {
    let mut ids = Vec::new();
    let mut rest = match line.find('(') {
        Some(start) => &line[start..],
        None => return Ok(ids),
    };

    while let Some(open) = rest.find('(') {
        let close = rest[open..]
            .find(')')
            .map(|c| open + c)
            .ok_or_else(|| RoutingError::MalformedToken(rest[open..].to_string()))?;
        let token = &rest[open + 1..close];
        if let Some(id) = parse_token(token)? {
            ids.push(id);
        }
        rest = &rest[close + 1..];
    }
    Ok(ids)
}

/// Returns the service id of an `S` token, `None` for a depot token.
fn parse_token(token: &str) -> Result<Option<ServiceId>> {
    let malformed = || RoutingError::MalformedToken(format!("({token})"));
    let (tag, body) = token.trim().split_once(' ').ok_or_else(malformed)?;
    let fields: Vec<&str> = body.split(',').map(str::trim).collect();
    if fields.len() != 3 || fields.iter().any(|f| f.parse::<usize>().is_err()) {
        return Err(malformed());
    }
    match tag {
        "D" => Ok(None),
        "S" => fields[0].parse().map(Some).map_err(|_| malformed()),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructive::path_scanning;
    use crate::distance::Graph;
    use crate::models::{ArcRoutingProblem, ServiceCatalog};

    fn star() -> ArcRoutingProblem {
        let mut g = Graph::new(5);
        for v in 2..=5 {
            g.add_edge(1, v, 1.0).expect("valid");
        }
        g.add_arc(2, 3, 1.0).expect("valid");
        let mut c = ServiceCatalog::new();
        c.register_node(2, 4, 0.0).expect("valid");
        c.register_arc(2, 3, 3, 1.0).expect("valid");
        c.register_edge(1, 4, 4, 1.0).expect("valid");
        c.register_node(5, 6, 0.0).expect("valid");
        ArcRoutingProblem::from_graph(&g, c, 1, 10).expect("valid")
    }

    #[test]
    fn test_parse_sequence() {
        let ids = parse_sequence("(D 0,1,1) (S 4,2,2) (S 1,3,4) (D 0,1,1)").expect("valid");
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn test_parse_full_line_skips_summary() {
        let ids = parse_sequence("0 1 2 7 11.5 2 (D 0,1,2) (S 3,1,2) (S 5,2,2) (D 0,1,2)")
            .expect("valid");
        assert_eq!(ids, vec![3, 5]);
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(parse_sequence("").expect("valid").is_empty());
    }

    #[test]
    fn test_parse_malformed_tokens() {
        for line in ["(X 1,2,3)", "(S 1,2)", "(S a,2,3)", "(D 0,1,1) (S 2,3,4", "(S1,2,3)"] {
            assert!(
                matches!(parse_sequence(line), Err(RoutingError::MalformedToken(_))),
                "{line}"
            );
        }
    }

    #[test]
    fn test_round_trip_reproduces_coverage() {
        let p = star();
        let solution = path_scanning(&p).expect("valid");
        let text = render_solution(&solution, p.required_count());
        let mut lines = text.lines();

        let total: i64 = lines.next().and_then(|l| l.parse().ok()).expect("cost");
        assert_eq!(total, solution.total_cost().round() as i64);
        let routes: usize = lines.next().and_then(|l| l.parse().ok()).expect("routes");
        assert_eq!(routes, solution.num_routes());
        assert_eq!(lines.next(), Some("4"));
        assert_eq!(lines.next(), Some("4"));

        let mut ids: Vec<ServiceId> = Vec::new();
        for line in lines {
            ids.extend(parse_sequence(line).expect("valid"));
        }
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_route_lines_match_routes() {
        let p = star();
        let solution = path_scanning(&p).expect("valid");
        let lines = route_lines(&solution);
        assert_eq!(lines.len(), solution.num_routes());
        for (line, route) in lines.iter().zip(solution.routes()) {
            assert!(line.starts_with(&format!("0 1 {} ", route.id())));
            assert_eq!(parse_sequence(line).expect("valid"), route.service_ids());
        }
    }
}
