//! Fixed academic catalog: department → year → semester → subjects.
//!
//! Both the issuer and the client validate attendance-session keys against
//! this table, so a session can only ever be issued for a class that exists.

use thiserror::Error;

type Semester = (&'static str, &'static [&'static str]);
type Year = (&'static str, &'static [Semester]);
type Department = (&'static str, &'static [Year]);

/// Year code → semester codes.
const YEAR_SEMESTERS: &[(&str, &[&str])] = &[
    ("FY", &["SEM1", "SEM2"]),
    ("SY", &["SEM3", "SEM4"]),
    ("TY", &["SEM5", "SEM6"]),
    ("LY", &["SEM7", "SEM8"]),
];

const SEMESTER_NAMES: &[(&str, &str)] = &[
    ("SEM1", "Semester 1"),
    ("SEM2", "Semester 2"),
    ("SEM3", "Semester 3"),
    ("SEM4", "Semester 4"),
    ("SEM5", "Semester 5"),
    ("SEM6", "Semester 6"),
    ("SEM7", "Semester 7"),
    ("SEM8", "Semester 8"),
];

const CATALOG: &[Department] = &[
    (
        "AIDS",
        &[
            (
                "FY",
                &[
                    (
                        "SEM1",
                        &[
                            "Engineering Mathematics I",
                            "Engineering Physics",
                            "Engineering Chemistry",
                            "Basic Electrical Engineering",
                            "Programming for Problem Solving",
                        ],
                    ),
                    (
                        "SEM2",
                        &[
                            "Engineering Mathematics II",
                            "Engineering Graphics",
                            "Environmental Science",
                            "Introduction to AI & DS",
                            "Python Programming",
                        ],
                    ),
                ],
            ),
            (
                "SY",
                &[
                    (
                        "SEM3",
                        &[
                            "Data Structures",
                            "Database Management Systems",
                            "Statistical Methods for DS",
                            "Computer Organization",
                            "Discrete Mathematics",
                        ],
                    ),
                    (
                        "SEM4",
                        &[
                            "Design & Analysis of Algorithms",
                            "Operating Systems",
                            "Machine Learning Fundamentals",
                            "Data Visualization",
                            "Web Technologies",
                        ],
                    ),
                ],
            ),
            (
                "TY",
                &[
                    (
                        "SEM5",
                        &[
                            "Big Data Analytics",
                            "Deep Learning",
                            "Cloud Computing",
                            "Natural Language Processing",
                            "Data Mining",
                        ],
                    ),
                    (
                        "SEM6",
                        &[
                            "Computer Vision",
                            "Reinforcement Learning",
                            "IoT & Data Analytics",
                            "Distributed Systems",
                            "Business Intelligence",
                        ],
                    ),
                ],
            ),
            (
                "LY",
                &[
                    (
                        "SEM7",
                        &[
                            "AI Ethics & Governance",
                            "Advanced Machine Learning",
                            "Data Engineering",
                            "Project Management",
                            "Elective I",
                        ],
                    ),
                    (
                        "SEM8",
                        &[
                            "Industry Internship",
                            "Capstone Project",
                            "Elective II",
                            "Elective III",
                        ],
                    ),
                ],
            ),
        ],
    ),
    (
        "CSE",
        &[
            (
                "FY",
                &[
                    (
                        "SEM1",
                        &[
                            "Engineering Mathematics I",
                            "Engineering Physics",
                            "Engineering Chemistry",
                            "Basic Electrical Engineering",
                            "Programming for Problem Solving",
                        ],
                    ),
                    (
                        "SEM2",
                        &[
                            "Engineering Mathematics II",
                            "Engineering Graphics",
                            "Environmental Science",
                            "Introduction to Programming",
                            "Digital Logic",
                        ],
                    ),
                ],
            ),
            (
                "SY",
                &[
                    (
                        "SEM3",
                        &[
                            "Data Structures",
                            "Database Management Systems",
                            "Computer Organization",
                            "Discrete Mathematics",
                            "Object Oriented Programming",
                        ],
                    ),
                    (
                        "SEM4",
                        &[
                            "Design & Analysis of Algorithms",
                            "Operating Systems",
                            "Computer Networks",
                            "Software Engineering",
                            "Web Technologies",
                        ],
                    ),
                ],
            ),
            (
                "TY",
                &[
                    (
                        "SEM5",
                        &[
                            "Theory of Computation",
                            "Compiler Design",
                            "Computer Graphics",
                            "Artificial Intelligence",
                            "Elective I",
                        ],
                    ),
                    (
                        "SEM6",
                        &[
                            "Distributed Systems",
                            "Mobile Computing",
                            "Information Security",
                            "Machine Learning",
                            "Elective II",
                        ],
                    ),
                ],
            ),
            (
                "LY",
                &[
                    (
                        "SEM7",
                        &[
                            "Big Data Analytics",
                            "Cloud Computing",
                            "Internet of Things",
                            "Project Management",
                            "Elective III",
                        ],
                    ),
                    (
                        "SEM8",
                        &[
                            "Industry Internship",
                            "Capstone Project",
                            "Elective IV",
                            "Elective V",
                        ],
                    ),
                ],
            ),
        ],
    ),
    (
        "CY",
        &[
            (
                "FY",
                &[
                    (
                        "SEM1",
                        &[
                            "Engineering Mathematics I",
                            "Engineering Physics",
                            "Engineering Chemistry",
                            "Basic Electrical Engineering",
                            "Programming for Problem Solving",
                        ],
                    ),
                    (
                        "SEM2",
                        &[
                            "Engineering Mathematics II",
                            "Engineering Graphics",
                            "Environmental Science",
                            "Introduction to Cybersecurity",
                            "Digital Logic",
                        ],
                    ),
                ],
            ),
            (
                "SY",
                &[
                    (
                        "SEM3",
                        &[
                            "Data Structures",
                            "Database Management Systems",
                            "Computer Organization",
                            "Discrete Mathematics",
                            "Network Security Fundamentals",
                        ],
                    ),
                    (
                        "SEM4",
                        &[
                            "Design & Analysis of Algorithms",
                            "Operating Systems",
                            "Computer Networks",
                            "Cryptography",
                            "Web Security",
                        ],
                    ),
                ],
            ),
            (
                "TY",
                &[
                    (
                        "SEM5",
                        &[
                            "Information Security",
                            "Ethical Hacking",
                            "Digital Forensics",
                            "Secure Coding",
                            "Elective I",
                        ],
                    ),
                    (
                        "SEM6",
                        &[
                            "Malware Analysis",
                            "Security Operations",
                            "Penetration Testing",
                            "Cloud Security",
                            "Elective II",
                        ],
                    ),
                ],
            ),
            (
                "LY",
                &[
                    (
                        "SEM7",
                        &[
                            "Security Governance",
                            "Advanced Network Security",
                            "Mobile & IoT Security",
                            "Project Management",
                            "Elective III",
                        ],
                    ),
                    (
                        "SEM8",
                        &[
                            "Industry Internship",
                            "Capstone Project",
                            "Elective IV",
                            "Elective V",
                        ],
                    ),
                ],
            ),
        ],
    ),
    (
        "AIML",
        &[
            (
                "FY",
                &[
                    (
                        "SEM1",
                        &[
                            "Engineering Mathematics I",
                            "Engineering Physics",
                            "Engineering Chemistry",
                            "Basic Electrical Engineering",
                            "Programming for Problem Solving",
                        ],
                    ),
                    (
                        "SEM2",
                        &[
                            "Engineering Mathematics II",
                            "Engineering Graphics",
                            "Environmental Science",
                            "Introduction to AI & ML",
                            "Python Programming",
                        ],
                    ),
                ],
            ),
            (
                "SY",
                &[
                    (
                        "SEM3",
                        &[
                            "Data Structures",
                            "Database Management Systems",
                            "Linear Algebra for ML",
                            "Computer Organization",
                            "Probability & Statistics",
                        ],
                    ),
                    (
                        "SEM4",
                        &[
                            "Design & Analysis of Algorithms",
                            "Operating Systems",
                            "Machine Learning Fundamentals",
                            "Neural Networks",
                            "Web Technologies",
                        ],
                    ),
                ],
            ),
            (
                "TY",
                &[
                    (
                        "SEM5",
                        &[
                            "Deep Learning",
                            "Natural Language Processing",
                            "Computer Vision",
                            "Reinforcement Learning",
                            "Elective I",
                        ],
                    ),
                    (
                        "SEM6",
                        &[
                            "AI Applications",
                            "ML Operations",
                            "Big Data for ML",
                            "Generative AI",
                            "Elective II",
                        ],
                    ),
                ],
            ),
            (
                "LY",
                &[
                    (
                        "SEM7",
                        &[
                            "AI Ethics",
                            "Advanced Deep Learning",
                            "Robotics & AI",
                            "Project Management",
                            "Elective III",
                        ],
                    ),
                    (
                        "SEM8",
                        &[
                            "Industry Internship",
                            "Capstone Project",
                            "Elective IV",
                            "Elective V",
                        ],
                    ),
                ],
            ),
        ],
    ),
];

/// Why a (department, year, semester, subject) key was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),
    #[error("Unknown year: {0}")]
    UnknownYear(String),
    #[error("Semester {semester} does not belong to year {year}")]
    SemesterNotInYear { year: String, semester: String },
    #[error("Subject {subject} is not offered by {department} {year}")]
    UnknownSubject {
        department: String,
        year: String,
        subject: String,
    },
}

/// All department codes, in catalog order.
pub fn departments() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(dept, _)| *dept)
}

/// All year codes, in catalog order.
pub fn years() -> impl Iterator<Item = &'static str> {
    YEAR_SEMESTERS.iter().map(|(year, _)| *year)
}

/// Semester codes that belong to `year`; empty for an unknown year.
pub fn semesters_for_year(year: &str) -> &'static [&'static str] {
    YEAR_SEMESTERS
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, sems)| *sems)
        .unwrap_or(&[])
}

/// Display name for a semester code, e.g. `SEM3` → `Semester 3`.
pub fn semester_name(semester: &str) -> Option<&'static str> {
    SEMESTER_NAMES
        .iter()
        .find(|(code, _)| *code == semester)
        .map(|(_, name)| *name)
}

fn year_entry(department: &str, year: &str) -> Option<&'static [Semester]> {
    CATALOG
        .iter()
        .find(|(d, _)| *d == department)
        .and_then(|(_, years)| years.iter().find(|(y, _)| *y == year))
        .map(|(_, sems)| *sems)
}

/// Subjects offered for the exact combination, or an empty slice when the
/// combination is not in the catalog.
pub fn subjects(department: &str, year: &str, semester: &str) -> &'static [&'static str] {
    year_entry(department, year)
        .and_then(|sems| sems.iter().find(|(s, _)| *s == semester))
        .map(|(_, subjects)| *subjects)
        .unwrap_or(&[])
}

/// Validates a session key. When `semester` is `None` the subject only has to
/// be offered in some semester of `year`.
pub fn check(
    department: &str,
    year: &str,
    semester: Option<&str>,
    subject: &str,
) -> Result<(), CatalogError> {
    if !departments().any(|d| d == department) {
        return Err(CatalogError::UnknownDepartment(department.to_owned()));
    }
    let semesters = semesters_for_year(year);
    if semesters.is_empty() {
        return Err(CatalogError::UnknownYear(year.to_owned()));
    }

    let offered = match semester {
        Some(sem) => {
            if !semesters.contains(&sem) {
                return Err(CatalogError::SemesterNotInYear {
                    year: year.to_owned(),
                    semester: sem.to_owned(),
                });
            }
            subjects(department, year, sem).contains(&subject)
        }
        None => semesters
            .iter()
            .any(|sem| subjects(department, year, sem).contains(&subject)),
    };

    if offered {
        Ok(())
    } else {
        Err(CatalogError::UnknownSubject {
            department: department.to_owned(),
            year: year.to_owned(),
            subject: subject.to_owned(),
        })
    }
}
