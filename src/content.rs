//! Static page copy.

pub struct Section {
    pub id: &'static str,
    pub label: &'static str,
}

/// Page sections in document order; the spy registers them in this order.
pub const SECTIONS: [Section; 7] = [
    Section { id: "home", label: "Home" },
    Section { id: "about", label: "About" },
    Section { id: "skills", label: "Skills" },
    Section { id: "experience", label: "Experience" },
    Section { id: "projects", label: "Projects" },
    Section { id: "education", label: "Education" },
    Section { id: "contact", label: "Contact" },
];

pub fn section_ids() -> impl Iterator<Item = &'static str> {
    SECTIONS.iter().map(|section| section.id)
}

pub struct Profile {
    pub name: &'static str,
    pub title: &'static str,
    pub tagline: &'static str,
    pub bio: &'static str,
    pub location: &'static str,
    pub email: &'static str,
    pub github_url: &'static str,
    pub linkedin_url: &'static str,
    pub resume_url: &'static str,
}

pub const PROFILE: Profile = Profile {
    name: "Shivasai Nadigadda",
    title: "Software Engineer",
    tagline: "IIT Kharagpur graduate building scalable web applications and ad verification systems.",
    bio: "Software engineer with over two years of full-stack experience across React, Node.js, Python and cloud \
          infrastructure. Currently working on ad verification and fraud detection at Integral Ad Science, \
          previously building AI-driven customer engagement tools at Smiles.ai.",
    location: "India",
    email: "nadigaddashiva5@gmail.com",
    github_url: "https://github.com/Shivasaikgp",
    linkedin_url: "https://www.linkedin.com/in/nadigadda-shiva-s-a40475129/",
    resume_url: "/resume.pdf",
};

pub struct Skill {
    pub name: &'static str,
    pub proficiency: u8,
}

pub struct SkillCategory {
    pub category: &'static str,
    pub skills: &'static [Skill],
}

pub const SKILL_CATEGORIES: &[SkillCategory] = &[
    SkillCategory {
        category: "Frontend",
        skills: &[
            Skill { name: "React", proficiency: 88 },
            Skill { name: "TypeScript", proficiency: 82 },
            Skill { name: "JavaScript", proficiency: 90 },
            Skill { name: "HTML/CSS", proficiency: 85 },
        ],
    },
    SkillCategory {
        category: "Backend",
        skills: &[
            Skill { name: "Node.js", proficiency: 85 },
            Skill { name: "Python", proficiency: 83 },
            Skill { name: "Django", proficiency: 80 },
            Skill { name: "Java", proficiency: 72 },
        ],
    },
    SkillCategory {
        category: "Data",
        skills: &[
            Skill { name: "PostgreSQL", proficiency: 80 },
            Skill { name: "MongoDB", proficiency: 78 },
            Skill { name: "Redis", proficiency: 72 },
        ],
    },
    SkillCategory {
        category: "Infrastructure",
        skills: &[
            Skill { name: "Docker", proficiency: 82 },
            Skill { name: "AWS", proficiency: 75 },
            Skill { name: "Jenkins", proficiency: 70 },
            Skill { name: "Git", proficiency: 88 },
        ],
    },
];

pub struct Experience {
    pub company: &'static str,
    pub role: &'static str,
    pub period: &'static str,
    pub location: &'static str,
    pub highlights: &'static [&'static str],
    pub technologies: &'static [&'static str],
}

pub const EXPERIENCE: &[Experience] = &[
    Experience {
        company: "Integral Ad Science",
        role: "Software Engineer",
        period: "Jul 2023 - Present",
        location: "Mumbai, India",
        highlights: &[
            "Automated CI/CD pipelines with Jenkins and Docker, cutting deployment effort by 70%",
            "Tuned microservices and database queries for a 40% throughput gain",
            "Added a Redis caching layer that cut API response times by 60%",
        ],
        technologies: &["React", "TypeScript", "Node.js", "Python", "AWS", "Kubernetes", "PostgreSQL"],
    },
    Experience {
        company: "Smiles.ai",
        role: "Full Stack Developer",
        period: "Jun 2022 - Jun 2023",
        location: "Bangalore, India",
        highlights: &[
            "Shipped React and Django applications used by 10,000+ daily users",
            "Built a WebSocket chat system with queued, guaranteed delivery",
            "Integrated sentiment models for automated response suggestions",
        ],
        technologies: &["React", "Python", "Django", "MongoDB", "WebSocket", "AWS"],
    },
    Experience {
        company: "IIT Kharagpur",
        role: "Research Intern",
        period: "Jan 2022 - May 2022",
        location: "Kharagpur, India",
        highlights: &[
            "Built ensemble models predicting student performance at 92% accuracy",
            "Co-authored an IEEE conference paper on educational analytics",
        ],
        technologies: &["Python", "Scikit-learn", "Pandas", "Jupyter"],
    },
];

pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
    pub technologies: &'static [&'static str],
    pub github_url: &'static str,
    pub live_url: Option<&'static str>,
}

pub const PROJECTS: &[Project] = &[
    Project {
        title: "Ad Fraud Detection System",
        description: "Real-time detection of fraudulent ad traffic with ensemble models.",
        technologies: &["Python", "TensorFlow", "Redis", "PostgreSQL"],
        github_url: "https://github.com/Shivasaikgp/ad-fraud-detector",
        live_url: None,
    },
    Project {
        title: "AI Customer Engagement Platform",
        description: "Automated customer conversations with sentiment analysis and smart replies.",
        technologies: &["React", "Django", "MongoDB", "WebSocket"],
        github_url: "https://github.com/Shivasaikgp/customer-engagement-platform",
        live_url: None,
    },
    Project {
        title: "Microservices API Gateway",
        description: "Gateway with JWT auth, rate limiting and service discovery.",
        technologies: &["Node.js", "Express", "Redis", "Kubernetes"],
        github_url: "https://github.com/Shivasaikgp/microservices-gateway",
        live_url: None,
    },
    Project {
        title: "Real-time Chat Application",
        description: "Group and direct messaging with presence and file sharing.",
        technologies: &["React", "Socket.io", "Node.js", "MongoDB"],
        github_url: "https://github.com/Shivasaikgp/realtime-chat-app",
        live_url: Some("https://realtime-chat-shivasai.herokuapp.com"),
    },
    Project {
        title: "Creative Portfolio Website",
        description: "This site: animated sections, scroll spy and live repository stats.",
        technologies: &["Rust", "Yew", "WebAssembly"],
        github_url: "https://github.com/Shivasaikgp/creative-portfolio",
        live_url: Some("https://shivasai-portfolio.vercel.app"),
    },
    Project {
        title: "Task Management System",
        description: "Collaborative boards with drag-and-drop and live updates.",
        technologies: &["React", "Node.js", "PostgreSQL", "Socket.io"],
        github_url: "https://github.com/Shivasaikgp/task-management-system",
        live_url: Some("https://task-tracker-shivasai.netlify.app"),
    },
];

pub struct Education {
    pub degree: &'static str,
    pub institution: &'static str,
    pub years: &'static str,
    pub grade: &'static str,
    pub highlights: &'static [&'static str],
}

pub const EDUCATION: Education = Education {
    degree: "B.Tech in Computer Science and Engineering",
    institution: "Indian Institute of Technology, Kharagpur",
    years: "2019 - 2023",
    grade: "8.7/10.0",
    highlights: &[
        "Dean's List in 2021 and 2022",
        "Best Project Award for a final-year thesis on machine learning in educational analytics",
        "Represented the institute at the Inter-IIT Tech Meet",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn section_ids_are_unique_and_start_at_home() {
        let ids: Vec<&str> = section_ids().collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();

        assert_eq!(ids.first(), Some(&"home"));
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn skill_proficiency_is_a_percentage() {
        assert!(SKILL_CATEGORIES
            .iter()
            .flat_map(|category| category.skills)
            .all(|skill| skill.proficiency <= 100));
    }
}
