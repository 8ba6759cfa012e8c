//! Public blog handlers - no authentication, published posts only.

use actix_web::{HttpResponse, web};

use serif_core::domain::PublicPost;
use serif_shared::dto::PublicPostResponse;

use crate::config::AppConfig;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn public_post_response(post: PublicPost, body: Option<String>) -> PublicPostResponse {
    PublicPostResponse {
        id: post.id,
        title: post.title,
        slug: post.slug,
        summary: post.summary,
        body,
        image: post.image,
        author: post.author,
        read_time: post.read_time,
        created_at: post.created_at,
        author_first_name: post.author_first_name,
        author_avatar_url: post.author_avatar_url,
    }
}

/// GET /api/blog
///
/// Card data for the blog index. Bodies are omitted; they are only served
/// by the single-post route, where they get sanitized.
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.list_published().await?;
    let response: Vec<PublicPostResponse> = posts
        .into_iter()
        .map(|post| public_post_response(post, None))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/blog/{slug}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_published_by_slug(&path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    // Post bodies are author-supplied HTML; strip anything dangerous before
    // it reaches a browser.
    let body = post.body.as_deref().map(ammonia::clean);

    Ok(HttpResponse::Ok().json(public_post_response(post, body)))
}

/// GET /sitemap.xml
pub async fn sitemap(
    state: web::Data<AppState>,
    config: web::Data<AppConfig>,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_published().await?;
    let xml = render_sitemap(&config.public_base_url, &posts);

    Ok(HttpResponse::Ok()
        .content_type("application/xml")
        .body(xml))
}

/// GET /robots.txt
pub async fn robots(config: web::Data<AppConfig>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain")
        .body(robots_body(&config.public_base_url))
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn render_sitemap(base_url: &str, posts: &[PublicPost]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    xml.push_str(&format!(
        "  <url>\n    <loc>{base_url}/</loc>\n    <changefreq>daily</changefreq>\n    <priority>1.0</priority>\n  </url>\n",
    ));
    xml.push_str(&format!(
        "  <url>\n    <loc>{base_url}/blog</loc>\n    <changefreq>daily</changefreq>\n    <priority>0.9</priority>\n  </url>\n",
    ));

    for post in posts {
        let loc = format!("{}/blog/{}", base_url, xml_escape(&post.slug));
        let lastmod = post.created_at.format("%Y-%m-%d");
        xml.push_str(&format!(
            "  <url>\n    <loc>{loc}</loc>\n    <lastmod>{lastmod}</lastmod>\n    <changefreq>weekly</changefreq>\n    <priority>0.8</priority>\n  </url>\n",
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

fn robots_body(base_url: &str) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /dashboard/\nDisallow: /api/\nDisallow: /auth/\n\nSitemap: {base_url}/sitemap.xml\n",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn published(slug: &str) -> PublicPost {
        PublicPost {
            id: Uuid::new_v4(),
            title: "Title".to_string(),
            slug: slug.to_string(),
            summary: None,
            body: None,
            image: None,
            author: Some("Ada".to_string()),
            read_time: Some(4),
            created_at: Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap(),
            author_first_name: Some("Ada".to_string()),
            author_avatar_url: None,
        }
    }

    #[test]
    fn sitemap_lists_static_pages_and_posts() {
        let xml = render_sitemap("https://serif.example", &[published("hello-world")]);
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<loc>https://serif.example/</loc>"));
        assert!(xml.contains("<loc>https://serif.example/blog</loc>"));
        assert!(xml.contains("<loc>https://serif.example/blog/hello-world</loc>"));
        assert!(xml.contains("<lastmod>2025-03-14</lastmod>"));
        assert!(xml.ends_with("</urlset>\n"));
    }

    #[test]
    fn sitemap_escapes_slugs() {
        let xml = render_sitemap("https://serif.example", &[published("a&b")]);
        assert!(xml.contains("<loc>https://serif.example/blog/a&amp;b</loc>"));
    }

    #[test]
    fn robots_points_at_the_sitemap() {
        let body = robots_body("https://serif.example");
        assert!(body.contains("Disallow: /dashboard/"));
        assert!(body.contains("Disallow: /api/"));
        assert!(body.contains("Sitemap: https://serif.example/sitemap.xml"));
    }
}
